//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for triangle meshes. This structure enables O(1) adjacency queries and is
//! the foundation for the geometry-processing algorithms in [`crate::algo`].
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin** (opposite half-edge), **next** (next half-edge
//!   around the face), **origin vertex**, and **incident face**
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Boundary half-edges (on mesh boundaries) have an invalid face ID. Their twins
//! are the interior half-edges. Boundary loops can be traversed using the `next`
//! pointer on boundary half-edges. A boundary vertex's stored half-edge is
//! always a boundary half-edge, so ring circulation starting there covers the
//! full open fan.
//!
//! # Attributes
//!
//! Besides positions, a mesh can carry optional attribute channels: per-vertex
//! normals, UVs and colors, and per-corner (half-edge) UVs and tangent frames.
//! Per-corner UVs take precedence over per-vertex UVs and allow seams: the
//! same vertex can have a different UV in each incident face. The corner
//! attribute of half-edge `h` belongs to the corner at `dest(h)`.

use nalgebra::{Point3, Vector2, Vector3};

use super::aabb::Aabb;
use super::index::{FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face (clockwise).
    /// Redundant, but speeds up many operations.
    pub prev: HalfEdgeId,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId,
}

impl HalfEdge {
    /// Create a new uninitialized half-edge.
    pub fn new() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId) -> Self {
        Self { halfedge }
    }
}

/// A half-edge mesh for triangle meshes, with optional attribute channels.
///
/// Connectivity is immutable after construction (see
/// [`build_from_triangles`](super::builder::build_from_triangles)); positions
/// and attributes may be rewritten in place by the algorithms.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face>,

    /// Per-vertex flag set by the builder for vertices touching an edge
    /// declared by more than two faces.
    pub(crate) nonmanifold: Vec<bool>,

    /// Per-vertex normals.
    pub(crate) vertex_normals: Option<Vec<Vector3<f64>>>,

    /// Per-vertex UV coordinates (no seams).
    pub(crate) vertex_uvs: Option<Vec<Vector2<f64>>>,

    /// Per-corner UV coordinates, indexed by half-edge. The UV of half-edge
    /// `h` belongs to the corner at `dest(h)`. Takes precedence over
    /// `vertex_uvs` when both exist.
    pub(crate) corner_uvs: Option<Vec<Vector2<f64>>>,

    /// Per-vertex colors (RGB in [0, 1]).
    pub(crate) vertex_colors: Option<Vec<Vector3<f64>>>,

    /// Per-corner tangents, indexed by half-edge. Valid only if `tb_computed`.
    pub(crate) corner_tangents: Option<Vec<Vector3<f64>>>,

    /// Per-corner bitangents, indexed by half-edge. Valid only if `tb_computed`.
    pub(crate) corner_bitangents: Option<Vec<Vector3<f64>>>,

    /// Whether tangent/bitangent frames are up to date. Invalidated whenever
    /// geometry or UVs change.
    pub(crate) tb_computed: bool,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Each interior edge is shared by two faces, so a closed mesh has
        // 3F half-edges; leave headroom for boundary half-edges.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            ..Self::default()
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by ID.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Invalidates any previously computed tangent frames.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
        self.tb_computed = false;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.twin(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let start = self.vertex(v).halfedge;
        if !start.is_valid() {
            return true;
        }

        // Walk the ring with the same step as VertexHalfEdgeIter.
        let mut he = start;
        loop {
            if self.is_boundary_halfedge(he) {
                return true;
            }
            let twin = self.twin(he);
            if !twin.is_valid() {
                return true;
            }
            he = self.next(twin);
            if !he.is_valid() || he == start {
                break;
            }
        }
        false
    }

    /// Check if a vertex has a well-formed, fully manifold star.
    ///
    /// False for vertices the builder flagged as touching an over-shared edge
    /// and for boundary/isolated vertices. Curvature estimators require this.
    pub fn is_manifold_vertex(&self, v: VertexId) -> bool {
        !self.nonmanifold[v.index()] && !self.is_boundary_vertex(v)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    ///
    /// The iterator is finite even on boundary or broken rings: it stops when
    /// the walk returns to the start or reaches an invalid link.
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex, in cyclic ring order.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v).filter_map(|he| {
            let f = self.face_of(he);
            f.is_valid().then_some(f)
        })
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Compute the valence (degree) of a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    // ==================== Geometry ====================

    /// Compute the normal of a face. Zero vector for degenerate faces.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        if len < f64::EPSILON {
            Vector3::zeros()
        } else {
            n / len
        }
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the bounding box of the mesh.
    ///
    /// Degenerate zero box (with a warning) if the mesh has no vertices.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    // ==================== Attributes ====================

    /// Get the stored per-vertex normals, if any.
    pub fn vertex_normals(&self) -> Option<&[Vector3<f64>]> {
        self.vertex_normals.as_deref()
    }

    /// Get the stored normal of a vertex, if normals exist.
    pub fn vertex_normal(&self, v: VertexId) -> Option<Vector3<f64>> {
        self.vertex_normals.as_ref().map(|ns| ns[v.index()])
    }

    /// Replace the per-vertex normal channel.
    pub fn set_vertex_normals(&mut self, normals: Vec<Vector3<f64>>) {
        debug_assert_eq!(normals.len(), self.num_vertices());
        self.vertex_normals = Some(normals);
    }

    /// Get the stored per-vertex colors, if any.
    pub fn vertex_colors(&self) -> Option<&[Vector3<f64>]> {
        self.vertex_colors.as_deref()
    }

    /// Replace the per-vertex color channel.
    pub fn set_vertex_colors(&mut self, colors: Vec<Vector3<f64>>) {
        debug_assert_eq!(colors.len(), self.num_vertices());
        self.vertex_colors = Some(colors);
    }

    /// Replace the per-vertex UV channel. Invalidates tangent frames.
    pub fn set_vertex_uvs(&mut self, uvs: Vec<Vector2<f64>>) {
        debug_assert_eq!(uvs.len(), self.num_vertices());
        self.vertex_uvs = Some(uvs);
        self.tb_computed = false;
    }

    /// Replace the per-corner UV channel. Invalidates tangent frames.
    pub fn set_corner_uvs(&mut self, uvs: Vec<Vector2<f64>>) {
        debug_assert_eq!(uvs.len(), self.num_halfedges());
        self.corner_uvs = Some(uvs);
        self.tb_computed = false;
    }

    /// Whether any UV channel (per-corner or per-vertex) exists.
    pub fn has_uvs(&self) -> bool {
        self.corner_uvs.is_some() || self.vertex_uvs.is_some()
    }

    /// The UV at the corner of half-edge `he`, i.e. at `dest(he)` within
    /// the face of `he`. Per-corner UVs win over per-vertex UVs.
    pub fn corner_uv(&self, he: HalfEdgeId) -> Option<Vector2<f64>> {
        if let Some(uvs) = &self.corner_uvs {
            return Some(uvs[he.index()]);
        }
        self.vertex_uvs.as_ref().map(|uvs| uvs[self.dest(he).index()])
    }

    /// Whether tangent/bitangent frames are up to date.
    pub fn tb_computed(&self) -> bool {
        self.tb_computed
    }

    /// The tangent at the corner of half-edge `he`, if frames are computed.
    pub fn corner_tangent(&self, he: HalfEdgeId) -> Option<Vector3<f64>> {
        if !self.tb_computed {
            return None;
        }
        self.corner_tangents.as_ref().map(|ts| ts[he.index()])
    }

    /// The bitangent at the corner of half-edge `he`, if frames are computed.
    pub fn corner_bitangent(&self, he: HalfEdgeId) -> Option<Vector3<f64>> {
        if !self.tb_computed {
            return None;
        }
        self.corner_bitangents.as_ref().map(|bs| bs[he.index()])
    }

    /// Store per-corner tangent frames and mark them up to date.
    pub fn set_tangent_frames(
        &mut self,
        tangents: Vec<Vector3<f64>>,
        bitangents: Vec<Vector3<f64>>,
    ) {
        debug_assert_eq!(tangents.len(), self.num_halfedges());
        debug_assert_eq!(bitangents.len(), self.num_halfedges());
        self.corner_tangents = Some(tangents);
        self.corner_bitangents = Some(bitangents);
        self.tb_computed = true;
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for (i, v) in self.vertices.iter().enumerate() {
            if v.halfedge.is_valid() {
                let he = self.halfedge(v.halfedge);
                if he.origin != VertexId::new(i) {
                    return false;
                }
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            let heid = HalfEdgeId::new(i);
            if he.twin.is_valid() && self.halfedge(he.twin).twin != heid {
                return false;
            }
            if he.next.is_valid() && self.halfedge(he.next).prev != heid {
                return false;
            }
            if he.prev.is_valid() && self.halfedge(he.prev).next != heid {
                return false;
            }
        }

        self.faces.iter().all(|f| f.halfedge.is_valid())
    }
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If he goes v -> w, twin(he) goes w -> v, and next(twin(he))
        // originates at v again: the next outgoing half-edge.
        let twin = self.mesh.twin(self.current);
        if !twin.is_valid() {
            self.done = true;
            return Some(result);
        }
        self.current = self.mesh.next(twin);

        // Broken rings (non-manifold input) may never return to the start.
        if !self.current.is_valid() || self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if !self.current.is_valid() || self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::new(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert!(!v.halfedge.is_valid());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(!mesh.tb_computed());
    }

    #[test]
    fn test_halfedge_boundary_flag() {
        let he = HalfEdge::new();
        assert!(he.is_boundary());
    }
}
