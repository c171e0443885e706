//! Discrete curvature estimation.
//!
//! Two per-vertex estimators on a half-edge mesh:
//!
//! - **Mean curvature H** from the cotangent-weighted Laplace-Beltrami
//!   operator normalized by the mixed Voronoi area (Meyer et al. 2003,
//!   "Discrete Differential-Geometry Operators for Triangulated
//!   2-Manifolds")
//! - **Surface variation** from the eigenvalues of the 1-ring covariance
//!   matrix (Pauly et al. 2002, "Efficient Simplification of Point-Sampled
//!   Surfaces"): 0 on planar patches, approaching 1/3 for isotropic noise
//!
//! Both estimators are pure functions of the current geometry. Vertices with
//! a non-manifold or open star get the sentinel value 0, never NaN. The
//! color mapping bundled here turns either scalar field into per-vertex
//! colors on a green-to-red hue ramp, clamped at the 95th percentile.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::mesh::{HalfEdgeMesh, VertexId};

/// Which curvature measure to estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvatureMeasure {
    /// Mean curvature from the cotangent Laplacian.
    Mean,
    /// Surface variation from the 1-ring covariance eigenvalues.
    Variation,
}

// ==================== Geometric helpers ====================

/// Cotangent of the angle at `a` in triangle (a, b, c).
///
/// Returns 0 for degenerate corners (zero-length edge or collinear points)
/// instead of dividing by zero.
fn cotangent(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    let cross_norm = ab.cross(&ac).norm();
    if cross_norm < 1e-10 {
        0.0
    } else {
        ab.dot(&ac) / cross_norm
    }
}

/// Sum of the two cotangent weights of the ring edge (xi, xj).
///
/// `xj_minus` and `xj_plus` are the ring neighbors before and after `xj`;
/// the weights are the angles opposite the edge in triangles
/// (xj_minus, xj, xi) and (xj_plus, xi, xj).
fn sum_cotangent(
    xi: &Point3<f64>,
    xj: &Point3<f64>,
    xj_minus: &Point3<f64>,
    xj_plus: &Point3<f64>,
) -> f64 {
    cotangent(xj_minus, xj, xi) + cotangent(xj_plus, xi, xj)
}

/// Whether the corner at `a` in triangle (a, b, c) is obtuse.
#[inline]
fn is_angle_obtuse_at(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> bool {
    (b - a).dot(&(c - a)) < 0.0
}

/// Whether any corner of the triangle is obtuse.
fn is_triangle_obtuse(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> bool {
    is_angle_obtuse_at(p0, p1, p2)
        || is_angle_obtuse_at(p1, p2, p0)
        || is_angle_obtuse_at(p2, p0, p1)
}

/// Voronoi area contribution of a non-obtuse triangle at vertex P.
///
/// `(|PR|^2 cot Q + |PQ|^2 cot R) / 8` where Q and R are the other two
/// vertices.
fn voronoi_contribution(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> f64 {
    let pr = r - p;
    let pq = q - p;
    let cot_q = cotangent(q, p, r);
    let cot_r = cotangent(r, p, q);
    0.125 * (pr.norm_squared() * cot_q + pq.norm_squared() * cot_r)
}

/// Mixed Voronoi area of a vertex (Meyer et al.).
///
/// Per incident triangle: the true Voronoi contribution when the triangle is
/// non-obtuse, half the triangle area when the obtuse corner is at `v`, a
/// quarter otherwise. Returns 0 for vertices without a manifold star.
pub fn mixed_area(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    if !mesh.is_manifold_vertex(v) {
        return 0.0;
    }

    let mut area = 0.0;
    for f in mesh.vertex_faces(v) {
        let verts = mesh.face_triangle(f);
        let [p0, p1, p2] = mesh.face_positions(f);

        let (p, q, r) = if verts[0] == v {
            (&p0, &p1, &p2)
        } else if verts[1] == v {
            (&p1, &p2, &p0)
        } else {
            (&p2, &p0, &p1)
        };

        if !is_triangle_obtuse(&p0, &p1, &p2) {
            area += voronoi_contribution(p, q, r);
        } else {
            let tri_area = mesh.face_area(f);
            if is_angle_obtuse_at(p, q, r) {
                area += tri_area / 2.0;
            } else {
                area += tri_area / 4.0;
            }
        }
    }
    area
}

// ==================== Mean curvature ====================

/// Mean curvature at a single vertex.
///
/// Accumulates the cotangent-weighted Laplacian
/// `K = sum_j (cot a_ij + cot b_ij) (x_i - x_j)` over the 1-ring, divides by
/// twice the mixed area, and returns half the magnitude. Returns 0 for
/// non-manifold or boundary vertices and for degenerate (sub-epsilon) mixed
/// areas.
pub fn mean_curvature_at(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    if !mesh.is_manifold_vertex(v) {
        return 0.0;
    }

    let ring: Vec<VertexId> = mesh.vertex_neighbors(v).collect();
    if ring.len() < 3 {
        return 0.0;
    }

    let area = mixed_area(mesh, v);
    if area < f64::EPSILON {
        return 0.0;
    }

    let xi = mesh.position(v);
    let mut k = Vector3::zeros();
    for (idx, &j) in ring.iter().enumerate() {
        let xj = mesh.position(j);
        let xj_minus = mesh.position(ring[(idx + ring.len() - 1) % ring.len()]);
        let xj_plus = mesh.position(ring[(idx + 1) % ring.len()]);

        k += sum_cotangent(xi, xj, xj_minus, xj_plus) * (xi - xj);
    }

    0.5 * (k / (2.0 * area)).norm()
}

/// Mean curvature for every vertex.
pub fn mean_curvature(mesh: &HalfEdgeMesh) -> Vec<f64> {
    mesh.vertex_ids().map(|v| mean_curvature_at(mesh, v)).collect()
}

// ==================== Surface variation ====================

/// Surface variation at a single vertex.
///
/// Builds the 1-ring point cloud (the vertex plus its direct neighbors),
/// forms the covariance of the deviations from the cloud centroid, and
/// returns `l0 / (l0 + l1 + l2)` with eigenvalues sorted ascending. Returns
/// 0 for degenerate neighborhoods (fewer than three neighbors or zero
/// covariance trace).
pub fn surface_variation_at(mesh: &HalfEdgeMesh, v: VertexId) -> f64 {
    let mut cloud: Vec<Point3<f64>> = vec![*mesh.position(v)];
    cloud.extend(mesh.vertex_neighbors(v).map(|n| *mesh.position(n)));
    if cloud.len() < 4 {
        return 0.0;
    }

    let mut centroid = Vector3::zeros();
    for p in &cloud {
        centroid += p.coords;
    }
    centroid /= cloud.len() as f64;

    let mut cov = Matrix3::zeros();
    for p in &cloud {
        let d = p.coords - centroid;
        cov += d * d.transpose();
    }

    let mut eigenvalues: Vec<f64> = cov
        .symmetric_eigen()
        .eigenvalues
        .iter()
        .copied()
        .collect();
    eigenvalues.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let trace: f64 = eigenvalues.iter().sum();
    if trace < f64::EPSILON {
        return 0.0;
    }
    (eigenvalues[0] / trace).max(0.0)
}

/// Surface variation for every vertex.
pub fn surface_variation(mesh: &HalfEdgeMesh) -> Vec<f64> {
    mesh.vertex_ids()
        .map(|v| surface_variation_at(mesh, v))
        .collect()
}

// ==================== Color mapping ====================

/// Map a scalar field to per-vertex RGB colors on a green-to-red ramp.
///
/// The clamp bound is the 95th-percentile value of the field, discarding the
/// top 5% as outliers. Values strictly between 0 and the bound map linearly
/// to hue `120 - 120 * value / bound` degrees (green at 0, red at the
/// bound); everything else, including non-positive values, gets hue 0 (red).
/// Deterministic: the same input array always yields the same colors.
pub fn curvature_colors(values: &[f64]) -> Vec<Vector3<f64>> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let bound = if sorted.is_empty() {
        0.0
    } else {
        sorted[(sorted.len() as f64 * 0.95) as usize]
    };

    values
        .iter()
        .map(|&value| {
            let hue = if value > 0.0 && value < bound {
                120.0 - 120.0 * (value / bound)
            } else {
                0.0
            };
            hsv_to_rgb(hue, 1.0, 1.0)
        })
        .collect()
}

/// Convert an HSV color (hue in degrees, saturation and value in [0, 1])
/// to RGB.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Vector3<f64> {
    let c = v * s;
    let hp = (h / 60.0).rem_euclid(6.0);
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = v - c;
    Vector3::new(r + m, g + m, b + m)
}

/// Compute the chosen curvature measure and store it as vertex colors,
/// overwriting any previous color channel.
pub fn colorize(mesh: &mut HalfEdgeMesh, measure: CurvatureMeasure) {
    let values = match measure {
        CurvatureMeasure::Mean => mean_curvature(mesh),
        CurvatureMeasure::Variation => surface_variation(mesh),
    };
    mesh.set_vertex_colors(curvature_colors(&values));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;
    use std::collections::HashMap;

    fn flat_grid(n: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                vertices.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = j * (n + 1) + i + 1;
                let v01 = (j + 1) * (n + 1) + i;
                let v11 = (j + 1) * (n + 1) + i + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    /// Unit icosphere: icosahedron with midpoint subdivision, vertices
    /// projected back onto the unit sphere.
    fn icosphere(subdivisions: usize) -> HalfEdgeMesh {
        let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let scale = 1.0 / (1.0 + phi * phi).sqrt();

        let mut vertices = vec![
            Point3::new(-1.0, phi, 0.0) * scale,
            Point3::new(1.0, phi, 0.0) * scale,
            Point3::new(-1.0, -phi, 0.0) * scale,
            Point3::new(1.0, -phi, 0.0) * scale,
            Point3::new(0.0, -1.0, phi) * scale,
            Point3::new(0.0, 1.0, phi) * scale,
            Point3::new(0.0, -1.0, -phi) * scale,
            Point3::new(0.0, 1.0, -phi) * scale,
            Point3::new(phi, 0.0, -1.0) * scale,
            Point3::new(phi, 0.0, 1.0) * scale,
            Point3::new(-phi, 0.0, -1.0) * scale,
            Point3::new(-phi, 0.0, 1.0) * scale,
        ];

        let mut faces = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        for _ in 0..subdivisions {
            let mut new_faces = Vec::new();
            let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();

            for face in &faces {
                let mut mids = [0usize; 3];
                for i in 0..3 {
                    let v0 = face[i];
                    let v1 = face[(i + 1) % 3];
                    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

                    mids[i] = *midpoints.entry(key).or_insert_with(|| {
                        let mid = (vertices[v0].coords + vertices[v1].coords) / 2.0;
                        vertices.push(Point3::from(mid.normalize()));
                        vertices.len() - 1
                    });
                }

                new_faces.push([face[0], mids[0], mids[2]]);
                new_faces.push([face[1], mids[1], mids[0]]);
                new_faces.push([face[2], mids[2], mids[1]]);
                new_faces.push([mids[0], mids[1], mids[2]]);
            }

            faces = new_faces;
        }

        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_mean_curvature_flat_interior() {
        let mesh = flat_grid(3);
        for v in mesh.vertex_ids() {
            if mesh.is_manifold_vertex(v) {
                assert!(mean_curvature_at(&mesh, v).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_mean_curvature_unit_sphere() {
        // For a unit sphere H = 1/r = 1; a twice-subdivided icosphere gets
        // within a few percent.
        let mesh = icosphere(2);
        for v in mesh.vertex_ids() {
            let h = mean_curvature_at(&mesh, v);
            assert!(
                (h - 1.0).abs() < 0.1,
                "mean curvature {} too far from 1 at {:?}",
                h,
                v
            );
        }
    }

    #[test]
    fn test_mean_curvature_boundary_is_zero() {
        let mesh = flat_grid(2);
        for v in mesh.vertex_ids() {
            if mesh.is_boundary_vertex(v) {
                assert_eq!(mean_curvature_at(&mesh, v), 0.0);
            }
        }
    }

    #[test]
    fn test_mean_curvature_nonmanifold_is_zero() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mean_curvature_at(&mesh, VertexId::new(0)), 0.0);
        assert_eq!(mean_curvature_at(&mesh, VertexId::new(1)), 0.0);
    }

    #[test]
    fn test_mixed_area_covers_sphere() {
        // The mixed areas partition the surface: their sum approximates the
        // sphere area 4 pi (slightly less, the mesh is inscribed).
        let mesh = icosphere(2);
        let total: f64 = mesh.vertex_ids().map(|v| mixed_area(&mesh, v)).sum();
        let sphere_area = 4.0 * std::f64::consts::PI;
        assert!((total - sphere_area).abs() / sphere_area < 0.05);
    }

    #[test]
    fn test_obtuse_tests() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(-1.0, 0.2, 0.0);
        // Angle at a between b and c is close to 180 degrees
        assert!(is_angle_obtuse_at(&a, &b, &c));
        assert!(is_triangle_obtuse(&a, &b, &c));

        let c2 = Point3::new(0.5, 1.0, 0.0);
        assert!(!is_triangle_obtuse(&a, &b, &c2));
    }

    #[test]
    fn test_cotangent_right_angle() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert!(cotangent(&a, &b, &c).abs() < 1e-12);
        // 45 degree corners of the same triangle
        assert!((cotangent(&b, &a, &c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cotangent_degenerate_is_zero() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(2.0, 0.0, 0.0);
        assert_eq!(cotangent(&a, &b, &c), 0.0);
        assert_eq!(cotangent(&a, &a, &c), 0.0);
    }

    #[test]
    fn test_surface_variation_flat_interior() {
        let mesh = flat_grid(3);
        for v in mesh.vertex_ids() {
            if mesh.is_manifold_vertex(v) {
                assert!(surface_variation_at(&mesh, v) < 1e-10);
            }
        }
    }

    #[test]
    fn test_surface_variation_sphere_in_range() {
        let mesh = icosphere(1);
        for v in mesh.vertex_ids() {
            let sv = surface_variation_at(&mesh, v);
            assert!(sv > 0.0 && sv < 1.0 / 3.0 + 1e-9);
        }
    }

    #[test]
    fn test_hsv_endpoints() {
        assert!((hsv_to_rgb(0.0, 1.0, 1.0) - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((hsv_to_rgb(120.0, 1.0, 1.0) - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
        assert!((hsv_to_rgb(240.0, 1.0, 1.0) - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_color_mapping_deterministic() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 10.0).collect();
        let a = curvature_colors(&values);
        let b = curvature_colors(&values);
        assert_eq!(a, b);
    }

    #[test]
    fn test_color_mapping_extremes_are_red() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let colors = curvature_colors(&values);

        // value 0 and values above the 95th-percentile bound both map to red
        assert_eq!(colors[0], Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(colors[99], Vector3::new(1.0, 0.0, 0.0));

        // a small positive value maps near green
        assert!(colors[1].y > 0.9);
        assert!(colors[1].x < 0.1);
    }

    #[test]
    fn test_colorize_overwrites_colors() {
        let mut mesh = icosphere(1);
        mesh.set_vertex_colors(vec![Vector3::zeros(); mesh.num_vertices()]);

        colorize(&mut mesh, CurvatureMeasure::Mean);

        let colors = mesh.vertex_colors().unwrap();
        assert_eq!(colors.len(), mesh.num_vertices());
        assert!(colors.iter().any(|c| *c != Vector3::zeros()));
    }
}
