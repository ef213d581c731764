//! Atomic JSON report output.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use fsinventory_core::RunReport;

use crate::error::ReportError;

/// Writes a report to a destination path.
///
/// The report is staged in a temporary file next to the destination and then
/// renamed over it, so the destination is either the complete new report or
/// left as it was.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    /// Create a writer for a destination path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode a report as pretty-printed JSON.
    pub fn render(report: &RunReport) -> Result<Vec<u8>, ReportError> {
        let mut json = serde_json::to_vec_pretty(report)?;
        json.push(b'\n');
        Ok(json)
    }

    /// Write the report, replacing any existing file.
    pub fn write(&self, report: &RunReport) -> Result<(), ReportError> {
        let json = Self::render(report)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source: std::io::Error| ReportError::Write {
            path: self.path.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(&json).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged
            .persist(&self.path)
            .map_err(|e| ReportError::Persist {
                path: self.path.clone(),
                source: e.error,
            })?;

        info!(
            path = %self.path.display(),
            files = report.total_files(),
            bytes = json.len(),
            "Report written"
        );
        Ok(())
    }
}
