//! Error types for conversion runs.

use std::path::PathBuf;
use thiserror::Error;
use urdf2ply_data::DataError;
use urdf2ply_model::ModelError;

/// Errors that abort a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write combined point cloud: {0}")]
    Combined(#[source] DataError),
}

/// Reasons a single visual is skipped. None of these stop the run.
#[derive(Debug, Error)]
pub enum VisualError {
    #[error("no mesh geometry")]
    NoMesh,

    #[error("mesh file missing: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("no pose computed for link '{0}'")]
    MissingPose(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl VisualError {
    /// Whether the visual was skipped for an expected reason rather than a failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            VisualError::NoMesh
                | VisualError::MissingFile(_)
                | VisualError::Data(DataError::UnsupportedFormat(_))
                | VisualError::Data(DataError::DegenerateMesh(_))
        )
    }
}

/// Errors loading a color table from disk.
#[derive(Debug, Error)]
pub enum ColorTableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
