// Error types for the treeplay replay core.
// Covers trace validation, layout-engine failures, and export packaging.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("malformed trace: {0}")]
    MalformedTrace(String),

    #[error("layout engine rejected description: {message}")]
    Layout { message: String },

    #[error("export failed at step {step}: {source}")]
    Export {
        step: usize,
        #[source]
        source: Box<ReplayError>,
    },

    #[error("exploration engine error: {0}")]
    Engine(String),

    #[error("no export directory available")]
    MissingExportDir,

    #[error("no trace installed")]
    NoTrace,

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ReplayError {
    /// Wrap an error as the failure of a 1-based export step.
    pub fn export_step(step: usize, source: ReplayError) -> Self {
        ReplayError::Export {
            step,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplayError>;
