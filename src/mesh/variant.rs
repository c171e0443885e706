//! Mesh representation variants and the renderer flattening contract.
//!
//! A viewer does not care which representation a mesh uses; it needs flat
//! attribute arrays to fill GPU buffers and a bounding box to place the
//! camera. [`RenderBuffers`] is that contract, and [`MeshVariant`] is the
//! closed sum of the two concrete representations, so dispatch is a `match`
//! rather than virtual calls in hot loops.

use log::warn;

use super::aabb::Aabb;
use super::halfedge::HalfEdgeMesh;
use super::soup::SoupMesh;

/// Flattening contract consumed by the rendering layer.
///
/// All streams are parallel: entry `i` of every non-empty attribute array
/// describes the same vertex. Streams are single precision; geometry is kept
/// in f64 internally and narrowed here. Attributes that are absent or do not
/// cover every vertex flatten to an empty array (with a warning), which
/// callers treat as "do not bind".
pub trait RenderBuffers {
    /// Vertex positions.
    fn positions(&self) -> Vec<[f32; 3]>;
    /// Vertex normals, or empty if none are stored.
    fn normals(&self) -> Vec<[f32; 3]>;
    /// Vertex colors, or empty if none are stored.
    fn colors(&self) -> Vec<[f32; 3]>;
    /// Texture coordinates, or empty if none are stored.
    fn texcoords(&self) -> Vec<[f32; 2]>;
    /// Tangents, or empty unless frames have been computed.
    fn tangents(&self) -> Vec<[f32; 3]>;
    /// Bitangents, or empty unless frames have been computed.
    fn bitangents(&self) -> Vec<[f32; 3]>;
    /// Triangle index list into the flattened streams.
    fn indices(&self) -> Vec<u32>;
    /// Axis-aligned bounding box for scene setup.
    fn bounding_box(&self) -> Aabb;
}

impl RenderBuffers for SoupMesh {
    fn positions(&self) -> Vec<[f32; 3]> {
        self.positions
            .iter()
            .map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    fn normals(&self) -> Vec<[f32; 3]> {
        if self.normals.is_empty() || self.normals.len() != self.positions.len() {
            warn!("mesh has no per-vertex normals to flatten");
            return Vec::new();
        }
        self.normals
            .iter()
            .map(|n| [n.x as f32, n.y as f32, n.z as f32])
            .collect()
    }

    fn colors(&self) -> Vec<[f32; 3]> {
        if self.colors.is_empty() || self.colors.len() != self.positions.len() {
            warn!("mesh has no per-vertex colors to flatten");
            return Vec::new();
        }
        self.colors
            .iter()
            .map(|c| [c.x as f32, c.y as f32, c.z as f32])
            .collect()
    }

    fn texcoords(&self) -> Vec<[f32; 2]> {
        if self.texcoords.is_empty() || self.texcoords.len() != self.positions.len() {
            warn!("mesh has no per-vertex texture coordinates to flatten");
            return Vec::new();
        }
        self.texcoords
            .iter()
            .map(|t| [t.x as f32, t.y as f32])
            .collect()
    }

    fn tangents(&self) -> Vec<[f32; 3]> {
        if !self.tb_computed || self.tangents.len() != self.positions.len() {
            warn!("mesh has no tangent frames to flatten");
            return Vec::new();
        }
        self.tangents
            .iter()
            .map(|t| [t.x as f32, t.y as f32, t.z as f32])
            .collect()
    }

    fn bitangents(&self) -> Vec<[f32; 3]> {
        if !self.tb_computed || self.bitangents.len() != self.positions.len() {
            warn!("mesh has no tangent frames to flatten");
            return Vec::new();
        }
        self.bitangents
            .iter()
            .map(|b| [b.x as f32, b.y as f32, b.z as f32])
            .collect()
    }

    fn indices(&self) -> Vec<u32> {
        self.indices.clone()
    }

    fn bounding_box(&self) -> Aabb {
        SoupMesh::bounding_box(self)
    }
}

impl RenderBuffers for HalfEdgeMesh {
    // The half-edge mesh flattens per corner so per-corner attributes (UV
    // seams, tangent frames) survive: each face contributes three entries,
    // one per half-edge, carrying the attributes of the corner at dest(he).
    // Indices are therefore the trivial sequence 0..3F.

    fn positions(&self) -> Vec<[f32; 3]> {
        self.corner_stream(|he| {
            let p = self.position(self.dest(he));
            [p.x as f32, p.y as f32, p.z as f32]
        })
    }

    fn normals(&self) -> Vec<[f32; 3]> {
        if self.vertex_normals().is_none() {
            warn!("mesh has no normals to flatten");
            return Vec::new();
        }
        self.corner_stream(|he| {
            let n = self.vertex_normal(self.dest(he)).unwrap_or_default();
            [n.x as f32, n.y as f32, n.z as f32]
        })
    }

    fn colors(&self) -> Vec<[f32; 3]> {
        let colors = match self.vertex_colors() {
            Some(c) => c,
            None => {
                warn!("mesh has no colors to flatten");
                return Vec::new();
            }
        };
        self.corner_stream(|he| {
            let c = colors[self.dest(he).index()];
            [c.x as f32, c.y as f32, c.z as f32]
        })
    }

    fn texcoords(&self) -> Vec<[f32; 2]> {
        if !self.has_uvs() {
            warn!("mesh has no texture coordinates to flatten");
            return Vec::new();
        }
        self.corner_stream(|he| {
            let uv = self.corner_uv(he).unwrap_or_default();
            [uv.x as f32, uv.y as f32]
        })
    }

    fn tangents(&self) -> Vec<[f32; 3]> {
        if !self.tb_computed() {
            warn!("mesh has no tangent frames to flatten");
            return Vec::new();
        }
        self.corner_stream(|he| {
            let t = self.corner_tangent(he).unwrap_or_default();
            [t.x as f32, t.y as f32, t.z as f32]
        })
    }

    fn bitangents(&self) -> Vec<[f32; 3]> {
        if !self.tb_computed() {
            warn!("mesh has no tangent frames to flatten");
            return Vec::new();
        }
        self.corner_stream(|he| {
            let b = self.corner_bitangent(he).unwrap_or_default();
            [b.x as f32, b.y as f32, b.z as f32]
        })
    }

    fn indices(&self) -> Vec<u32> {
        (0..self.num_faces() as u32 * 3).collect()
    }

    fn bounding_box(&self) -> Aabb {
        HalfEdgeMesh::bounding_box(self)
    }
}

impl HalfEdgeMesh {
    /// Collect one entry per face corner, visiting each face's half-edges
    /// in loop order.
    fn corner_stream<T>(&self, mut corner: impl FnMut(super::index::HalfEdgeId) -> T) -> Vec<T> {
        let mut out = Vec::with_capacity(self.num_faces() * 3);
        for f in self.face_ids() {
            for he in self.face_halfedges(f) {
                out.push(corner(he));
            }
        }
        out
    }
}

/// A triangle mesh in one of the two concrete representations.
#[derive(Debug, Clone)]
pub enum MeshVariant {
    /// Half-edge mesh with full adjacency.
    HalfEdge(HalfEdgeMesh),
    /// Flat polygon soup.
    Soup(SoupMesh),
}

impl MeshVariant {
    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        match self {
            MeshVariant::HalfEdge(m) => m.num_faces(),
            MeshVariant::Soup(m) => m.num_triangles(),
        }
    }

    /// Number of vertices in the underlying representation.
    pub fn num_vertices(&self) -> usize {
        match self {
            MeshVariant::HalfEdge(m) => m.num_vertices(),
            MeshVariant::Soup(m) => m.num_vertices(),
        }
    }
}

impl RenderBuffers for MeshVariant {
    fn positions(&self) -> Vec<[f32; 3]> {
        match self {
            MeshVariant::HalfEdge(m) => m.positions(),
            MeshVariant::Soup(m) => m.positions(),
        }
    }

    fn normals(&self) -> Vec<[f32; 3]> {
        match self {
            MeshVariant::HalfEdge(m) => m.normals(),
            MeshVariant::Soup(m) => m.normals(),
        }
    }

    fn colors(&self) -> Vec<[f32; 3]> {
        match self {
            MeshVariant::HalfEdge(m) => m.colors(),
            MeshVariant::Soup(m) => m.colors(),
        }
    }

    fn texcoords(&self) -> Vec<[f32; 2]> {
        match self {
            MeshVariant::HalfEdge(m) => m.texcoords(),
            MeshVariant::Soup(m) => m.texcoords(),
        }
    }

    fn tangents(&self) -> Vec<[f32; 3]> {
        match self {
            MeshVariant::HalfEdge(m) => m.tangents(),
            MeshVariant::Soup(m) => m.tangents(),
        }
    }

    fn bitangents(&self) -> Vec<[f32; 3]> {
        match self {
            MeshVariant::HalfEdge(m) => m.bitangents(),
            MeshVariant::Soup(m) => m.bitangents(),
        }
    }

    fn indices(&self) -> Vec<u32> {
        match self {
            MeshVariant::HalfEdge(m) => m.indices(),
            MeshVariant::Soup(m) => m.indices(),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            MeshVariant::HalfEdge(m) => RenderBuffers::bounding_box(m),
            MeshVariant::Soup(m) => RenderBuffers::bounding_box(m),
        }
    }
}
