//! Polygon-soup triangle mesh.
//!
//! Flat parallel attribute arrays with no shared-adjacency structure beyond
//! index reuse in the triangle list. Attribute continuity across triangles is
//! expressed purely through whether two corners map to the same vertex index;
//! deduplication happens once at import time (see [`crate::io::obj`]).

use log::warn;
use nalgebra::{Point3, Vector2, Vector3};

use super::aabb::Aabb;

/// A triangle mesh stored as flat parallel arrays.
///
/// `positions` is always populated. The other attribute arrays are
/// per-vertex; consumers treat any array that does not cover every vertex
/// as absent, so a malformed import degrades instead of crashing.
/// `indices.len()` is a multiple of three and every index is a valid
/// vertex id.
#[derive(Debug, Clone, Default)]
pub struct SoupMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
    /// Per-vertex normals (empty if absent).
    pub normals: Vec<Vector3<f64>>,
    /// Per-vertex colors, RGB in [0, 1] (empty if absent).
    pub colors: Vec<Vector3<f64>>,
    /// Per-vertex texture coordinates (empty if absent).
    pub texcoords: Vec<Vector2<f64>>,
    /// Per-vertex tangents, valid only if `tb_computed` (empty if absent).
    pub tangents: Vec<Vector3<f64>>,
    /// Per-vertex bitangents, valid only if `tb_computed` (empty if absent).
    pub bitangents: Vec<Vector3<f64>>,
    /// Triangle index list, three entries per triangle.
    pub indices: Vec<u32>,
    /// Whether tangent/bitangent arrays are up to date.
    pub tb_computed: bool,
}

impl SoupMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (deduplicated) vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh carries normals.
    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether the mesh carries texture coordinates.
    #[inline]
    pub fn has_texcoords(&self) -> bool {
        !self.texcoords.is_empty()
    }

    /// The three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        [
            self.indices[3 * t] as usize,
            self.indices[3 * t + 1] as usize,
            self.indices[3 * t + 2] as usize,
        ]
    }

    /// Compute area-weighted per-vertex normals, replacing any stored ones.
    ///
    /// Each triangle accumulates its unnormalized edge cross product (twice
    /// its area times its unit normal) into all three corners; accumulators
    /// are normalized once at the end. Zero-length accumulators from
    /// degenerate triangles are left as zero vectors rather than producing
    /// NaN.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vector3::zeros(); self.positions.len()];

        for t in 0..self.num_triangles() {
            let [i0, i1, i2] = self.triangle(t);
            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];
            let n = (p1 - p0).cross(&(p2 - p0));
            acc[i0] += n;
            acc[i1] += n;
            acc[i2] += n;
        }

        for n in &mut acc {
            let len = n.norm();
            if len > f64::EPSILON {
                *n /= len;
            }
        }

        self.normals = acc;
    }

    /// Compute per-vertex tangent/bitangent frames from texture coordinates.
    ///
    /// Warns and leaves the mesh untouched if texture coordinates are absent
    /// or do not cover every vertex. Corners sharing a vertex index overwrite
    /// each other; the last triangle visiting a vertex wins.
    pub fn compute_tangents(&mut self) {
        if self.texcoords.is_empty() || self.texcoords.len() != self.positions.len() {
            warn!("tangent computation skipped: mesh has no per-vertex texture coordinates");
            return;
        }

        let n = self.positions.len();
        let mut tangents = vec![Vector3::zeros(); n];
        let mut bitangents = vec![Vector3::zeros(); n];

        for t in 0..self.num_triangles() {
            let [i0, i1, i2] = self.triangle(t);
            let frame = tangent_frame(
                &self.positions[i0],
                &self.positions[i1],
                &self.positions[i2],
                &self.texcoords[i0],
                &self.texcoords[i1],
                &self.texcoords[i2],
            );
            if let Some((tangent, bitangent)) = frame {
                for i in [i0, i1, i2] {
                    tangents[i] = tangent;
                    bitangents[i] = bitangent;
                }
            }
        }

        self.tangents = tangents;
        self.bitangents = bitangents;
        self.tb_computed = true;
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }
}

/// Solve the closed-form tangent/bitangent system for one triangle.
///
/// Returns `None` when the UV parameterization is degenerate (zero
/// determinant).
pub(crate) fn tangent_frame(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    uv0: &Vector2<f64>,
    uv1: &Vector2<f64>,
    uv2: &Vector2<f64>,
) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let dp1 = p1 - p0;
    let dp2 = p2 - p0;
    let du1 = uv1.x - uv0.x;
    let dv1 = uv1.y - uv0.y;
    let du2 = uv2.x - uv0.x;
    let dv2 = uv2.y - uv0.y;

    let det = du1 * dv2 - du2 * dv1;
    if det.abs() < f64::EPSILON {
        return None;
    }
    let r = 1.0 / det;

    let tangent = (dp1 * dv2 - dp2 * dv1) * r;
    let bitangent = (dp2 * du1 - dp1 * du2) * r;

    let tl = tangent.norm();
    let bl = bitangent.norm();
    if tl < f64::EPSILON || bl < f64::EPSILON {
        return None;
    }

    Some((tangent / tl, bitangent / bl))
}
