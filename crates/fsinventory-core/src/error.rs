//! Error types for inventory runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Run-level errors. Per-entry and per-file problems never surface here.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root is neither a directory nor a regular file.
    #[error("Start path is not a directory or regular file: {path}")]
    UnsupportedRoot { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A pool thread could not be started.
    #[error("Failed to start worker thread: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Failure to digest a single file.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the file failed part way through.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    /// Underlying I/O error.
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => source,
        }
    }
}

/// Classification of a digest failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PermissionDenied,
    NotFound,
    Io,
}

/// Serializable summary of a [`DigestError`], stored on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl DigestFailure {
    /// Create a failure from a kind and message.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&DigestError> for DigestFailure {
    fn from(err: &DigestError) -> Self {
        let kind = match err.io_error().kind() {
            std::io::ErrorKind::PermissionDenied => FailureKind::PermissionDenied,
            std::io::ErrorKind::NotFound => FailureKind::NotFound,
            _ => FailureKind::Io,
        };
        Self::new(kind, err.to_string())
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Error reading a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// The same path was handed to the pool twice.
    DuplicatePath,
}

/// Non-fatal warning encountered during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a permission denied warning.
    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>, target: &str) -> Self {
        let path = path.into();
        Self {
            message: format!("Broken symlink: {} -> {target}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Create a metadata error warning, classifying permission failures.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::permission_denied(path);
        }
        Self::new(path, format!("Metadata error: {error}"), WarningKind::MetadataError)
    }

    /// Create a duplicate path warning.
    pub fn duplicate_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Duplicate descriptor ignored: {}", path.display()),
            path,
            kind: WarningKind::DuplicatePath,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));
    }

    #[test]
    fn test_digest_failure_classification() {
        let err = DigestError::Open {
            path: PathBuf::from("/gone"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let failure = DigestFailure::from(&err);
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert!(failure.message.contains("/gone"));
    }

    #[test]
    fn test_metadata_error_permission() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let warning = ScanWarning::metadata_error("/locked", &err);
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("Permission denied"));
    }
}
