//! # Trigon
//!
//! The geometry-processing core of a triangle-mesh viewer: half-edge mesh
//! traversal, discrete differential-geometry estimators, Laplacian
//! smoothing, and OBJ/STL import with corner deduplication. Rendering,
//! windowing, and camera interaction are out of scope; the crate hands a
//! viewer flat attribute arrays through the
//! [`RenderBuffers`](mesh::RenderBuffers) contract and a bounding box for
//! scene setup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use trigon::prelude::*;
//! use std::path::Path;
//!
//! // Load a mesh with full adjacency
//! let mut mesh = trigon::io::load_halfedge(Path::new("model.obj")).unwrap();
//!
//! // Smooth it and color it by mean curvature
//! trigon::algo::laplacian_smooth(&mut mesh, &SmoothOptions::default().with_iterations(5));
//! trigon::algo::colorize(&mut mesh, CurvatureMeasure::Mean);
//!
//! // Flatten for rendering
//! let positions = mesh.positions();
//! let colors = mesh.colors();
//! let bbox = mesh.bounding_box();
//! println!("center {:?}, radius {}", bbox.center(), bbox.radius());
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use trigon::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::algo::{CurvatureMeasure, SmoothOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, Aabb, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, MeshVariant, RenderBuffers, SoupMesh, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_load_and_flatten_pipeline() {
        let text = "\
v 0 0 0
v 1 0 0
v 0.5 1 0
v 0.5 0.5 1
f 1 3 2
f 1 2 4
f 2 3 4
f 3 1 4
";
        let mut mesh = crate::io::obj::parse_halfedge(text).unwrap();
        assert_eq!(mesh.num_faces(), 4);
        assert!(mesh.vertex_normals().is_some());

        crate::algo::colorize(&mut mesh, CurvatureMeasure::Mean);

        let positions = mesh.positions();
        let colors = mesh.colors();
        assert_eq!(positions.len(), 12);
        assert_eq!(colors.len(), 12);

        let bbox = mesh.bounding_box();
        assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
        assert!(bbox.radius() > 0.0);
    }
}
