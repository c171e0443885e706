//! Wavefront OBJ import and export.
//!
//! The importer is a two-pass parser: pass one collects the raw `v`/`vt`/`vn`
//! records, pass two resolves `f` lines. Four triangular face grammars are
//! tried in order (`f v v v`, `f v/t ...`, `f v//n ...`, `f v/t/n ...`);
//! lines matching none of them are skipped silently, matching the best-effort
//! handling of arbitrary OBJ exports. Corners are deduplicated on the
//! composite key (position, texcoord, normal), so UV seams and hard edges
//! keep distinct vertices while genuinely shared corners collapse.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::{Point3, Vector2, Vector3};

use crate::algo::geometry::compute_vertex_normals;
use crate::error::Result;
use crate::mesh::{build_from_triangles, HalfEdgeMesh, SoupMesh};

/// One face corner as referenced in the file: 1-based indices, 0 = absent.
type Corner = (usize, usize, usize);

/// Raw records of an OBJ file after the first pass.
#[derive(Debug, Default)]
struct ObjRecords {
    positions: Vec<Point3<f64>>,
    texcoords: Vec<Vector2<f64>>,
    normals: Vec<Vector3<f64>>,
    faces: Vec<[Corner; 3]>,
}

fn parse_floats<const N: usize>(rest: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut it = rest.split_whitespace();
    for v in &mut out {
        *v = it.next()?.parse().ok()?;
    }
    Some(out)
}

/// Try the four supported face grammars in order. Returns the three corners
/// as (v, t, n) index triples with 0 for absent components.
fn parse_face_line(rest: &str) -> Option<[Corner; 3]> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() != 3 {
        return None;
    }

    // f v v v
    let plain = |t: &str| -> Option<Corner> { Some((t.parse().ok()?, 0, 0)) };
    // f v/t v/t v/t
    let with_uv = |t: &str| -> Option<Corner> {
        let (v, t) = t.split_once('/')?;
        if t.contains('/') {
            return None;
        }
        Some((v.parse().ok()?, t.parse().ok()?, 0))
    };
    // f v//n v//n v//n
    let with_normal = |t: &str| -> Option<Corner> {
        let (v, rest) = t.split_once("//")?;
        Some((v.parse().ok()?, 0, rest.parse().ok()?))
    };
    // f v/t/n v/t/n v/t/n
    let full = |t: &str| -> Option<Corner> {
        let mut it = t.split('/');
        let v = it.next()?.parse().ok()?;
        let t = it.next()?.parse().ok()?;
        let n = it.next()?.parse().ok()?;
        it.next().is_none().then_some((v, t, n))
    };

    for grammar in [
        plain as fn(&str) -> Option<Corner>,
        with_uv,
        with_normal,
        full,
    ] {
        let corners: Option<Vec<Corner>> = tokens.iter().map(|t| grammar(t)).collect();
        if let Some(c) = corners {
            return Some([c[0], c[1], c[2]]);
        }
    }
    None
}

fn parse_records(text: &str) -> ObjRecords {
    let mut records = ObjRecords::default();

    // First pass: vertex data
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("v ") {
            if let Some([x, y, z]) = parse_floats::<3>(rest) {
                records.positions.push(Point3::new(x, y, z));
            }
        } else if let Some(rest) = line.strip_prefix("vt ") {
            if let Some([u, v]) = parse_floats::<2>(rest) {
                records.texcoords.push(Vector2::new(u, v));
            }
        } else if let Some(rest) = line.strip_prefix("vn ") {
            if let Some([x, y, z]) = parse_floats::<3>(rest) {
                records.normals.push(Vector3::new(x, y, z));
            }
        }
    }

    // Second pass: faces, now that every referenced record exists
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("f ") {
            match parse_face_line(rest) {
                Some(corners)
                    if corners
                        .iter()
                        .all(|&(v, _, _)| v >= 1 && v <= records.positions.len()) =>
                {
                    records.faces.push(corners);
                }
                _ => debug!("skipping unrecognized face line: {}", line),
            }
        }
    }

    records
}

/// Parse OBJ text into a deduplicated polygon soup.
///
/// Normals are computed if the file carries none.
pub fn parse(text: &str) -> SoupMesh {
    let records = parse_records(text);
    let mut mesh = SoupMesh::new();

    // Corner key -> deduplicated vertex id
    let mut dedup: HashMap<Corner, u32> = HashMap::new();

    for corners in &records.faces {
        for &(v, t, n) in corners {
            let id = *dedup.entry((v, t, n)).or_insert_with(|| {
                let id = mesh.positions.len() as u32;
                mesh.positions.push(records.positions[v - 1]);
                if t >= 1 && t <= records.texcoords.len() {
                    mesh.texcoords.push(records.texcoords[t - 1]);
                }
                if n >= 1 && n <= records.normals.len() {
                    mesh.normals.push(records.normals[n - 1]);
                }
                id
            });
            mesh.indices.push(id);
        }
    }

    if !mesh.has_normals() {
        mesh.compute_normals();
    }
    mesh
}

/// Serialize a soup mesh to OBJ text.
///
/// Vertex colors, when present, are appended to the `v` lines as the widely
/// supported `v x y z r g b` extension. Attribute arrays that do not cover
/// every vertex are treated as absent so no face line can reference a
/// missing record.
pub fn serialize(mesh: &SoupMesh) -> String {
    let mut out = String::new();

    let num = mesh.positions.len();
    let has_colors = !mesh.colors.is_empty() && mesh.colors.len() == num;
    let has_uvs = mesh.has_texcoords() && mesh.texcoords.len() == num;
    let has_normals = mesh.has_normals() && mesh.normals.len() == num;

    for (i, p) in mesh.positions.iter().enumerate() {
        if has_colors {
            let c = mesh.colors[i];
            let _ = writeln!(out, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z);
        } else {
            let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
        }
    }
    if has_uvs {
        for t in &mesh.texcoords {
            let _ = writeln!(out, "vt {} {}", t.x, t.y);
        }
    }
    if has_normals {
        for n in &mesh.normals {
            let _ = writeln!(out, "vn {} {} {}", n.x, n.y, n.z);
        }
    }

    for t in 0..mesh.num_triangles() {
        let [a, b, c] = mesh.triangle(t).map(|i| i + 1);
        let _ = match (has_uvs, has_normals) {
            (true, true) => writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}"),
            (false, true) => writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}"),
            (true, false) => writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}"),
            (false, false) => writeln!(out, "f {a} {b} {c}"),
        };
    }

    out
}

/// Load a soup mesh from an OBJ file.
pub fn load(path: &Path) -> Result<SoupMesh> {
    let text = fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Save a soup mesh to an OBJ file.
pub fn save(path: &Path, mesh: &SoupMesh) -> Result<()> {
    fs::write(path, serialize(mesh))?;
    Ok(())
}

/// Parse OBJ text into a half-edge mesh with shared vertices.
///
/// Positions are shared as declared by the `v` records (no corner
/// deduplication). Texcoords attach per corner, so seams survive; normals
/// attach per vertex, last writer wins, and are recomputed when the file has
/// none. Faces that are degenerate or out of range are skipped.
pub fn parse_halfedge(text: &str) -> Result<HalfEdgeMesh> {
    let records = parse_records(text);

    // Pre-filter faces the builder would reject
    let usable: Vec<[Corner; 3]> = records
        .faces
        .iter()
        .filter(|c| {
            let [v0, v1, v2] = [c[0].0, c[1].0, c[2].0];
            let distinct = v0 != v1 && v1 != v2 && v0 != v2;
            if !distinct {
                debug!("skipping degenerate face {:?}", c);
            }
            distinct
        })
        .copied()
        .collect();

    let faces: Vec<[usize; 3]> = usable
        .iter()
        .map(|c| [c[0].0 - 1, c[1].0 - 1, c[2].0 - 1])
        .collect();

    let mut mesh = build_from_triangles(&records.positions, &faces)?;

    // Corner UVs: the corner attribute of half-edge h belongs to dest(h).
    // Face half-edges (he0, he1, he2) originate at (v0, v1, v2), so their
    // corners are (v1, v2, v0).
    if usable.iter().any(|c| c.iter().any(|&(_, t, _)| t >= 1)) {
        let mut corner_uvs = vec![Vector2::zeros(); mesh.num_halfedges()];
        for (fi, corners) in usable.iter().enumerate() {
            let f = crate::mesh::FaceId::new(fi);
            let hes: Vec<_> = mesh.face_halfedges(f).collect();
            for (k, &he) in hes.iter().enumerate() {
                let (_, t, _) = corners[(k + 1) % 3];
                if t >= 1 && t <= records.texcoords.len() {
                    corner_uvs[he.index()] = records.texcoords[t - 1];
                }
            }
        }
        mesh.set_corner_uvs(corner_uvs);
    }

    let mut has_normals = false;
    let mut normals = vec![Vector3::zeros(); mesh.num_vertices()];
    for corners in &usable {
        for &(v, _, n) in corners {
            if n >= 1 && n <= records.normals.len() {
                normals[v - 1] = records.normals[n - 1];
                has_normals = true;
            }
        }
    }
    if has_normals {
        mesh.set_vertex_normals(normals);
    } else {
        compute_vertex_normals(&mut mesh);
    }

    Ok(mesh)
}

/// Load a half-edge mesh from an OBJ file.
pub fn load_halfedge(path: &Path) -> Result<HalfEdgeMesh> {
    let text = fs::read_to_string(path)?;
    parse_halfedge(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_PLAIN: &str = "\
v 0 0 0
v 1 0 0
v 0.5 1 0
f 1 2 3
";

    #[test]
    fn test_parse_plain_faces() {
        let mesh = parse(TRIANGLE_PLAIN);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.positions[2], Point3::new(0.5, 1.0, 0.0));
        // Normals computed since the file has none
        assert!(mesh.has_normals());
    }

    #[test]
    fn test_parse_uv_faces() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
";
        let mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.texcoords.len(), 3);
    }

    #[test]
    fn test_parse_normal_faces() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";
        let mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.normals[0], Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_parse_full_faces() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.texcoords.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
    }

    #[test]
    fn test_garbage_face_lines_skipped() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
f 1 2
f 1 2 3 4
f a b c
f 7 8 9
";
        let mesh = parse(text);
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn test_dedup_shared_corner() {
        // Two faces share corners 1 and 3 with identical index triples
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
f 2 4 3
";
        let mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn test_uv_seam_duplicates_vertex() {
        // Same position index, different texcoord index: two soup vertices
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vt 0.5 0.5
f 1/1 2/2 3/3
f 1/4 2/2 3/3
";
        let mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn test_roundtrip() {
        let original = parse(TRIANGLE_PLAIN);
        let reparsed = parse(&serialize(&original));

        assert_eq!(original.num_vertices(), reparsed.num_vertices());
        assert_eq!(original.indices.len(), reparsed.indices.len());
        for (a, b) in original.positions.iter().zip(reparsed.positions.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_roundtrip_with_uvs_and_normals() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let original = parse(text);
        let reparsed = parse(&serialize(&original));

        assert_eq!(reparsed.num_vertices(), 3);
        assert_eq!(reparsed.num_triangles(), 1);
        assert_eq!(original.texcoords.len(), reparsed.texcoords.len());
        assert_eq!(original.normals.len(), reparsed.normals.len());
        for (a, b) in original.positions.iter().zip(reparsed.positions.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
        for (a, b) in original.texcoords.iter().zip(reparsed.texcoords.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
        for (a, b) in original.normals.iter().zip(reparsed.normals.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_mixed_grammar_faces_degrade_safely() {
        // One textured face plus one plain face: the dedup pushes positions
        // without matching texcoords, so the texcoord array covers only part
        // of the vertices and every consumer must treat it as absent.
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
f 1 2 3
";
        let mut mesh = parse(text);
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_triangles(), 2);
        assert!(mesh.texcoords.len() < mesh.num_vertices());

        mesh.compute_tangents();
        assert!(!mesh.tb_computed);

        let out = serialize(&mesh);
        assert!(!out.contains("vt "));
        // Computed normals cover every vertex, so the v//n form is used
        assert!(out.contains("//"));
    }

    #[test]
    fn test_serialize_with_colors() {
        let mut mesh = parse(TRIANGLE_PLAIN);
        mesh.colors = vec![Vector3::new(1.0, 0.0, 0.0); mesh.num_vertices()];
        let text = serialize(&mesh);
        assert!(text.contains("v 0 0 0 1 0 0"));
    }

    #[test]
    fn test_parse_halfedge_shares_positions() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
f 2 4 3
";
        let mesh = parse_halfedge(text).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.vertex_normals().is_some());
    }

    #[test]
    fn test_parse_halfedge_corner_uvs() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
";
        let mesh = parse_halfedge(text).unwrap();
        assert!(mesh.has_uvs());

        // Each interior half-edge's corner UV matches its dest vertex's
        // texcoord from the file (uv index == vertex index here).
        let f = crate::mesh::FaceId::new(0);
        for he in mesh.face_halfedges(f) {
            let uv = mesh.corner_uv(he).unwrap();
            let dest = mesh.dest(he);
            let p = mesh.position(dest);
            assert_eq!(uv, Vector2::new(p.x, p.y));
        }
    }

    #[test]
    fn test_parse_halfedge_skips_degenerate_faces() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 1 2
f 1 2 3
";
        let mesh = parse_halfedge(text).unwrap();
        assert_eq!(mesh.num_faces(), 1);
    }
}
