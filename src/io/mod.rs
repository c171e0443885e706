//! Mesh file I/O.
//!
//! Formats are keyed by file extension: `.obj` and `.stl`. Each format
//! module exposes text/byte-level `parse`/`serialize` plus file-level
//! `load`/`save` wrappers; this module adds extension-based dispatch.

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, SoupMesh};

pub mod obj;
pub mod stl;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ.
    Obj,
    /// STL (binary or ASCII).
    Stl,
}

impl Format {
    /// Detect the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect the format from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: ext.to_string(),
        })
    }
}

/// Load a soup mesh, dispatching on the file extension.
pub fn load(path: &Path) -> Result<SoupMesh> {
    match Format::from_path(path)? {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
    }
}

/// Save a soup mesh, dispatching on the file extension.
pub fn save(path: &Path, mesh: &SoupMesh) -> Result<()> {
    match Format::from_path(path)? {
        Format::Obj => obj::save(path, mesh),
        Format::Stl => stl::save(path, mesh),
    }
}

/// Load a half-edge mesh, dispatching on the file extension.
pub fn load_halfedge(path: &Path) -> Result<HalfEdgeMesh> {
    match Format::from_path(path)? {
        Format::Obj => obj::load_halfedge(path),
        Format::Stl => stl::load_halfedge(path),
    }
}
