//! Error types for mesh loading and PLY I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading meshes or reading/writing PLY files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode STL '{path}': {source}")]
    Stl {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Mesh is not a usable triangle mesh: {0}")]
    DegenerateMesh(String),

    #[error("Face {face} references vertex {index} but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("PLY parsing error: {0}")]
    Ply(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
