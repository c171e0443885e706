//! Mesh data structures.
//!
//! Two concrete triangle-mesh representations:
//!
//! - [`HalfEdgeMesh`]: full adjacency via half-edges, the substrate for the
//!   geometry-processing algorithms in [`crate::algo`]
//! - [`SoupMesh`]: flat parallel attribute arrays produced by the OBJ/STL
//!   importers, suitable for direct indexed rendering
//!
//! [`MeshVariant`] unifies the two behind the [`RenderBuffers`] flattening
//! contract consumed by a viewer.

pub mod aabb;
pub mod builder;
pub mod halfedge;
pub mod index;
pub mod soup;
pub mod variant;

pub use aabb::Aabb;
pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{FaceId, HalfEdgeId, VertexId};
pub use soup::SoupMesh;
pub use variant::{MeshVariant, RenderBuffers};
