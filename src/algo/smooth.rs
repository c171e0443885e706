//! Laplacian smoothing.
//!
//! Uniform (umbrella) Laplacian smoothing with boundary-aware updates. Each
//! iteration is strictly two-pass: every vertex's 1-ring center of gravity
//! is materialized from the pre-iteration positions before any position is
//! written, so the result does not depend on vertex ordering.

use log::warn;
use nalgebra::Point3;

use super::geometry::compute_vertex_normals;
use crate::mesh::HalfEdgeMesh;

/// Options for Laplacian smoothing.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of smoothing iterations.
    pub iterations: usize,
    /// Step factor toward the 1-ring center of gravity. `1.0` snaps each
    /// vertex onto its COG; values above `1.0` amplify and are flagged.
    pub factor: f64,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            factor: 0.5,
        }
    }
}

impl SmoothOptions {
    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the step factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }
}

/// Smooth the mesh in place and recompute vertex normals.
///
/// Boundary vertices never move. Isolated vertices (empty 1-ring) are left
/// untouched. Vertex normals are recomputed after the final iteration, even
/// when `iterations` is zero.
pub fn laplacian_smooth(mesh: &mut HalfEdgeMesh, options: &SmoothOptions) {
    if options.factor > 1.0 {
        warn!(
            "smoothing factor {} exceeds 1.0, expect amplification",
            options.factor
        );
    }

    // Boundary classification does not change under position updates.
    let movable: Vec<bool> = mesh
        .vertex_ids()
        .map(|v| !mesh.is_boundary_vertex(v))
        .collect();

    for _ in 0..options.iterations {
        // First pass: every COG from the pre-iteration positions.
        let cogs: Vec<Option<Point3<f64>>> = mesh
            .vertex_ids()
            .map(|v| {
                let mut sum = nalgebra::Vector3::zeros();
                let mut count = 0usize;
                for n in mesh.vertex_neighbors(v) {
                    sum += mesh.position(n).coords;
                    count += 1;
                }
                (count > 0).then(|| Point3::from(sum / count as f64))
            })
            .collect();

        // Second pass: move the interior vertices.
        for v in mesh.vertex_ids().collect::<Vec<_>>() {
            if !movable[v.index()] {
                continue;
            }
            let Some(cog) = cogs[v.index()] else {
                continue;
            };
            let pos = *mesh.position(v);
            let new_pos = if options.factor == 1.0 {
                cog
            } else {
                pos + options.factor * (cog - pos)
            };
            mesh.set_position(v, new_pos);
        }
    }

    compute_vertex_normals(mesh);
}
