//! Report output errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the report file.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report could not be encoded.
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the staging file failed.
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The staging file could not be moved into place.
    #[error("Failed to persist report to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
