//! STL import and export.
//!
//! Both the ASCII and binary variants are supported on read; export always
//! writes binary. ASCII detection checks whether the first five bytes equal
//! `solid`. This sniff is the documented, compatibility-preserving default
//! even though it can misfire on a binary file whose header happens to start
//! with that word.
//!
//! Binary layout: 80-byte header, u32 triangle count, then per triangle a
//! 12-byte normal, three 12-byte vertices, and a u16 attribute count, all
//! little endian (50 bytes per triangle).

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::mesh::{build_from_triangles, HalfEdgeMesh, SoupMesh};

const HEADER_LEN: usize = 80;

/// Parse STL bytes (ASCII or binary) into a polygon soup.
///
/// STL has no shared-vertex indexing, so indices are the trivial sequence
/// `0..3N`. File normals are kept only when the ASCII variant declares
/// exactly one per facet; otherwise normals are recomputed from the
/// geometry. Binary facet normals are always discarded and recomputed.
pub fn parse(bytes: &[u8]) -> Result<SoupMesh> {
    let (positions, facet_normals) = if bytes.len() >= 5 && &bytes[0..5] == b"solid" {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)?
    };

    let mut mesh = SoupMesh {
        indices: (0..positions.len() as u32).collect(),
        positions,
        ..SoupMesh::default()
    };

    if !facet_normals.is_empty() && facet_normals.len() == mesh.num_triangles() {
        mesh.normals = facet_normals
            .iter()
            .flat_map(|&n| [n, n, n])
            .collect();
    } else {
        mesh.compute_normals();
    }

    Ok(mesh)
}

/// Line-oriented scan for `facet normal` and `vertex` tokens.
fn parse_ascii(bytes: &[u8]) -> (Vec<Point3<f64>>, Vec<Vector3<f64>>) {
    let text = String::from_utf8_lossy(bytes);
    let mut positions = Vec::new();
    let mut normals = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("facet normal ") {
            if let Some([x, y, z]) = three_floats(rest) {
                normals.push(Vector3::new(x, y, z));
            }
        } else if let Some(rest) = line.strip_prefix("vertex ") {
            if let Some([x, y, z]) = three_floats(rest) {
                positions.push(Point3::new(x, y, z));
            } else {
                debug!("skipping malformed vertex line: {}", line);
            }
        }
    }

    // Drop trailing incomplete facets
    positions.truncate(positions.len() / 3 * 3);
    (positions, normals)
}

fn three_floats(rest: &str) -> Option<[f64; 3]> {
    let mut out = [0.0; 3];
    let mut it = rest.split_whitespace();
    for v in &mut out {
        *v = it.next()?.parse().ok()?;
    }
    Some(out)
}

/// Fixed-layout binary parse. Facet normals are discarded.
fn parse_binary(bytes: &[u8]) -> Result<(Vec<Point3<f64>>, Vec<Vector3<f64>>)> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(HEADER_LEN as u64);

    let count = cursor.read_u32::<LittleEndian>()?;
    let mut positions = Vec::with_capacity(count as usize * 3);

    for _ in 0..count {
        for _ in 0..3 {
            cursor.read_f32::<LittleEndian>()?; // normal, discarded
        }
        for _ in 0..3 {
            let x = cursor.read_f32::<LittleEndian>()? as f64;
            let y = cursor.read_f32::<LittleEndian>()? as f64;
            let z = cursor.read_f32::<LittleEndian>()? as f64;
            positions.push(Point3::new(x, y, z));
        }
        cursor.read_u16::<LittleEndian>()?; // attribute byte count
    }

    Ok((positions, Vec::new()))
}

/// Serialize a soup mesh to binary STL.
///
/// Writes 50 bytes per triangle with zeroed facet normals and a zero
/// attribute count.
pub fn serialize(mesh: &SoupMesh) -> Vec<u8> {
    let count = mesh.num_triangles();
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + count * 50);

    let mut header = [0u8; HEADER_LEN];
    header[..12].copy_from_slice(b"Exported STL");
    out.extend_from_slice(&header);

    // Writes to a Vec cannot fail
    let _ = out.write_u32::<LittleEndian>(count as u32);
    for t in 0..count {
        for _ in 0..3 {
            let _ = out.write_f32::<LittleEndian>(0.0);
        }
        for i in mesh.triangle(t) {
            let p = mesh.positions[i];
            let _ = out.write_f32::<LittleEndian>(p.x as f32);
            let _ = out.write_f32::<LittleEndian>(p.y as f32);
            let _ = out.write_f32::<LittleEndian>(p.z as f32);
        }
        let _ = out.write_u16::<LittleEndian>(0);
    }

    out
}

/// Load a soup mesh from an STL file.
pub fn load(path: &Path) -> Result<SoupMesh> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

/// Save a soup mesh to a binary STL file.
pub fn save(path: &Path, mesh: &SoupMesh) -> Result<()> {
    fs::write(path, serialize(mesh))?;
    Ok(())
}

/// Parse STL bytes into a half-edge mesh.
///
/// STL repeats shared vertices per facet, so connectivity is recovered by
/// deduplicating bit-identical positions before building adjacency.
/// Degenerate facets (repeated corner after dedup) are skipped. Vertex
/// normals are recomputed.
pub fn parse_halfedge(bytes: &[u8]) -> Result<HalfEdgeMesh> {
    let soup = parse(bytes)?;

    let mut dedup: HashMap<(u64, u64, u64), usize> = HashMap::new();
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut remap = Vec::with_capacity(soup.num_vertices());

    for p in &soup.positions {
        let key = (p.x.to_bits(), p.y.to_bits(), p.z.to_bits());
        let id = *dedup.entry(key).or_insert_with(|| {
            positions.push(*p);
            positions.len() - 1
        });
        remap.push(id);
    }

    let mut faces = Vec::with_capacity(soup.num_triangles());
    for t in 0..soup.num_triangles() {
        let [a, b, c] = soup.triangle(t).map(|i| remap[i]);
        if a == b || b == c || a == c {
            debug!("skipping degenerate facet {}", t);
            continue;
        }
        faces.push([a, b, c]);
    }

    let mut mesh = build_from_triangles(&positions, &faces)?;
    crate::algo::geometry::compute_vertex_normals(&mut mesh);
    Ok(mesh)
}

/// Load a half-edge mesh from an STL file.
pub fn load_halfedge(path: &Path) -> Result<HalfEdgeMesh> {
    let bytes = fs::read(path)?;
    parse_halfedge(&bytes)
}
