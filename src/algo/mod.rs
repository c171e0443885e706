//! Geometry-processing algorithms.
//!
//! All algorithms run sequentially and to completion, operating on a
//! half-edge mesh through a mutable reference:
//!
//! - **Normals and tangent frames**: area-weighted vertex normals and
//!   UV-derived per-corner tangent/bitangent frames
//! - **Smoothing**: boundary-aware two-pass Laplacian smoothing
//! - **Curvature**: mean curvature and surface variation estimation, plus
//!   the green-to-red color mapping used for visualization

pub mod curvature;
pub mod geometry;
pub mod smooth;

pub use curvature::{colorize, mean_curvature, surface_variation, CurvatureMeasure};
pub use geometry::{compute_tangent_frames, compute_vertex_normals};
pub use smooth::{laplacian_smooth, SmoothOptions};
