//! Normal and tangent-frame computation for half-edge meshes.

use log::warn;
use nalgebra::Vector3;

use crate::mesh::soup::tangent_frame;
use crate::mesh::HalfEdgeMesh;

/// Compute area-weighted per-vertex normals and store them on the mesh.
///
/// Each face accumulates its unnormalized edge cross product (twice its area
/// times its unit normal) into all three corner vertices; accumulators are
/// normalized once at the end. Zero-length accumulators from degenerate
/// faces are left as zero vectors so no NaN can escape.
pub fn compute_vertex_normals(mesh: &mut HalfEdgeMesh) {
    let mut acc = vec![Vector3::zeros(); mesh.num_vertices()];

    for f in mesh.face_ids() {
        let [p0, p1, p2] = mesh.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        for v in mesh.face_triangle(f) {
            acc[v.index()] += n;
        }
    }

    for n in &mut acc {
        let len = n.norm();
        if len > f64::EPSILON {
            *n /= len;
        }
    }

    mesh.set_vertex_normals(acc);
}

/// Compute per-corner tangent/bitangent frames from the mesh's UVs.
///
/// Requires a UV channel (per-corner or per-vertex); warns and leaves the
/// mesh untouched when absent. Each face solves the closed-form
/// tangent-space system once and writes the frame to its three corner
/// half-edges. Faces with a degenerate UV parameterization keep zero
/// frames.
pub fn compute_tangent_frames(mesh: &mut HalfEdgeMesh) {
    if !mesh.has_uvs() {
        warn!("tangent computation skipped: mesh has no texture coordinates");
        return;
    }

    let mut tangents = vec![Vector3::zeros(); mesh.num_halfedges()];
    let mut bitangents = vec![Vector3::zeros(); mesh.num_halfedges()];

    for f in mesh.face_ids() {
        let corners: Vec<_> = mesh.face_halfedges(f).collect();
        debug_assert_eq!(corners.len(), 3);

        let pos = [
            *mesh.position(mesh.dest(corners[0])),
            *mesh.position(mesh.dest(corners[1])),
            *mesh.position(mesh.dest(corners[2])),
        ];
        let uvs = [
            mesh.corner_uv(corners[0]),
            mesh.corner_uv(corners[1]),
            mesh.corner_uv(corners[2]),
        ];
        let (Some(uv0), Some(uv1), Some(uv2)) = (uvs[0], uvs[1], uvs[2]) else {
            continue;
        };

        if let Some((t, b)) = tangent_frame(&pos[0], &pos[1], &pos[2], &uv0, &uv1, &uv2) {
            for &he in &corners {
                tangents[he.index()] = t;
                bitangents[he.index()] = b;
            }
        }
    }

    mesh.set_tangent_frames(tangents, bitangents);
}
