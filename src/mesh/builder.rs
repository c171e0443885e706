//! Half-edge mesh construction.
//!
//! Builds connectivity from a face-vertex list as found in mesh file formats.
//! Construction is best effort for arbitrary input: a duplicated directed
//! edge (an edge declared by more than two faces, or with inconsistent
//! winding) does not abort the build. The offending faces are kept, the
//! extra half-edge receives a boundary twin, and both endpoint vertices are
//! flagged non-manifold so that queries requiring manifoldness
//! ([`HalfEdgeMesh::is_manifold_vertex`]) can refuse them later.

use std::collections::HashMap;

use log::warn;
use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices
///
/// # Errors
/// [`MeshError::EmptyMesh`] for an empty face list,
/// [`MeshError::InvalidVertexIndex`] for an out-of-range index,
/// [`MeshError::DegenerateFace`] for a face with a repeated corner.
/// Non-manifold input is tolerated (see module docs).
///
/// # Example
/// ```
/// use trigon::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    for &pos in vertices {
        mesh.vertices.push(Vertex::new(pos));
    }
    mesh.nonmanifold = vec![false; vertices.len()];

    // Directed edge (origin, dest) of every interior half-edge, in creation
    // order, plus a map keeping the FIRST half-edge declared for each
    // directed edge.
    let mut directed: Vec<(usize, usize)> = Vec::with_capacity(faces.len() * 3);
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    // First pass: create all half-edges and faces.
    for face in faces {
        let [v0, v1, v2] = *face;

        let he0 = HalfEdgeId::new(mesh.num_halfedges());
        let he1 = HalfEdgeId::new(mesh.num_halfedges() + 1);
        let he2 = HalfEdgeId::new(mesh.num_halfedges() + 2);
        for _ in 0..3 {
            mesh.halfedges.push(HalfEdge::new());
        }

        let face_id = FaceId::new(mesh.num_faces());
        mesh.faces.push(Face::new(he0));

        for (&he, &(origin, next, prev)) in [he0, he1, he2]
            .iter()
            .zip([(v0, he1, he2), (v1, he2, he0), (v2, he0, he1)].iter())
        {
            let e = &mut mesh.halfedges[he.index()];
            e.origin = VertexId::new(origin);
            e.next = next;
            e.prev = prev;
            e.face = face_id;
            // Overwritten for shared vertices; fixed up for boundaries later
            mesh.vertices[origin].halfedge = he;
        }

        for (edge, he) in [((v0, v1), he0), ((v1, v2), he1), ((v2, v0), he2)] {
            directed.push(edge);
            if let Some(first) = edge_map.insert(edge, he) {
                // Edge declared twice in the same direction: non-manifold.
                // Keep the first declaration as the canonical half-edge.
                warn!(
                    "non-manifold edge ({}, {}) declared by multiple faces",
                    edge.0, edge.1
                );
                edge_map.insert(edge, first);
                mesh.nonmanifold[edge.0] = true;
                mesh.nonmanifold[edge.1] = true;
            }
        }
    }

    // Second pass: link twins. Half-edges without a matched reversal (true
    // boundaries and non-manifold extras) get a fresh boundary half-edge.
    for i in 0..directed.len() {
        let he = HalfEdgeId::new(i);
        let (a, b) = directed[i];

        let canonical = edge_map[&(a, b)] == he;
        let reverse = edge_map.get(&(b, a)).copied();

        if let (true, Some(twin)) = (canonical, reverse) {
            mesh.halfedges[he.index()].twin = twin;
        } else {
            let boundary_he = HalfEdgeId::new(mesh.num_halfedges());
            mesh.halfedges.push(HalfEdge::new());

            mesh.halfedges[he.index()].twin = boundary_he;
            let bhe = &mut mesh.halfedges[boundary_he.index()];
            bhe.origin = VertexId::new(b);
            bhe.twin = he;
            // Face stays invalid (boundary)
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Link boundary half-edges into loops via their origin vertices.
fn link_boundary_loops(mesh: &mut HalfEdgeMesh) {
    let boundary_hes: Vec<HalfEdgeId> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    // Group by origin vertex for quick lookup. A pinched (non-manifold)
    // vertex can have several outgoing boundary half-edges; only one wins,
    // leaving the others unlinked, which the circulators tolerate.
    let mut outgoing: HashMap<usize, HalfEdgeId> = HashMap::new();
    for &he in &boundary_hes {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary_hes {
        // The next boundary half-edge starts where this one ends
        let dest = mesh.dest(he).index();
        if let Some(&next_he) = outgoing.get(&dest) {
            mesh.halfedges[he.index()].next = next_he;
            mesh.halfedges[next_he.index()].prev = he;
        }
    }
}

/// Ensure boundary vertices point to a boundary half-edge, so that ring
/// circulation starting from the stored half-edge covers the full open fan.
fn fix_boundary_vertex_halfedges(mesh: &mut HalfEdgeMesh) {
    for vi in 0..mesh.num_vertices() {
        let start_he = mesh.vertices[vi].halfedge;
        if !start_he.is_valid() {
            continue;
        }

        // Same iteration pattern as VertexHalfEdgeIter: twin -> next
        let mut he = start_he;
        loop {
            if mesh.is_boundary_halfedge(he) {
                mesh.vertices[vi].halfedge = he;
                break;
            }
            let twin = mesh.twin(he);
            if !twin.is_valid() {
                break;
            }
            he = mesh.next(twin);
            if !he.is_valid() || he == start_he {
                break;
            }
        }
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns a (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| {
            let [v0, v1, v2] = mesh.face_triangle(f);
            [v0.index(), v1.index(), v2.index()]
        })
        .collect();

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    fn two_triangles() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        // Two triangles sharing an edge
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3]];
        (vertices, faces)
    }

    fn tetrahedron() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        // 3 interior half-edges + 3 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_two_triangles() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        // 6 interior half-edges + 4 boundary half-edges
        assert_eq!(mesh.num_halfedges(), 10);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let (vertices, faces) = tetrahedron();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        // Closed mesh: no boundary half-edges
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v));
            assert!(mesh.is_manifold_vertex(v));
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_ring_is_cyclic() {
        let (vertices, faces) = tetrahedron();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        for v in mesh.vertex_ids() {
            let ring: Vec<_> = mesh.vertex_neighbors(v).collect();
            assert_eq!(ring.len(), 3);
            // All neighbors distinct, none equal to the center
            for (i, &a) in ring.iter().enumerate() {
                assert_ne!(a, v);
                for &b in &ring[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = two_triangles();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);

        assert_eq!(vertices.len(), out_verts.len());
        assert_eq!(faces.len(), out_faces.len());

        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]]; // Indices 1 and 2 are invalid

        assert!(build_from_triangles(&vertices, &faces).is_err());
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let faces = vec![[0, 0, 2]]; // v0 == v1

        assert!(build_from_triangles(&vertices, &faces).is_err());
    }

    #[test]
    fn test_empty_face_list() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces: Vec<[usize; 3]> = vec![];

        assert!(matches!(
            build_from_triangles(&vertices, &faces),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_nonmanifold_edge_is_tolerated() {
        // Three triangles sharing the edge (0, 1); the third declares the
        // directed edge (0, 1) a second time.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];

        let mesh = build_from_triangles(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_faces(), 3);

        // Both endpoints of the over-shared edge are flagged
        assert!(!mesh.is_manifold_vertex(VertexId::new(0)));
        assert!(!mesh.is_manifold_vertex(VertexId::new(1)));

        // Circulation still terminates on the broken rings
        for v in mesh.vertex_ids() {
            assert!(mesh.vertex_neighbors(v).count() <= mesh.num_vertices());
        }
    }
}
