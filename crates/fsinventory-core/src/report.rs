//! Run report container and statistics.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::error::ScanWarning;
use crate::host::HostInfo;
use crate::record::FileRecord;

/// Summary statistics for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of records produced.
    pub total_files: u64,
    /// Sum of record sizes.
    pub total_bytes: u64,
    /// Records with at least one failed digest.
    pub digest_failures: u64,
    /// Number of traversal warnings.
    pub warnings: u64,
    /// Descriptors rejected because their path was already claimed.
    pub duplicates_rejected: u64,
    /// Descriptors dropped unprocessed because the run was aborted.
    pub skipped_on_abort: u64,
    /// Whether the run was aborted before the walk finished.
    pub aborted: bool,
    /// Largest file (path, size).
    pub largest_file: Option<(PathBuf, u64)>,
    /// When the run started.
    pub scanned_at: DateTime<Utc>,
    /// Wall-clock duration of the run.
    pub scan_duration: Duration,
}

impl Default for ScanSummary {
    fn default() -> Self {
        Self {
            total_files: 0,
            total_bytes: 0,
            digest_failures: 0,
            warnings: 0,
            duplicates_rejected: 0,
            skipped_on_abort: 0,
            aborted: false,
            largest_file: None,
            scanned_at: Utc::now(),
            scan_duration: Duration::ZERO,
        }
    }
}

impl ScanSummary {
    /// Create new empty stats stamped with the current time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a finished record.
    pub fn record_file(&mut self, record: &FileRecord) {
        self.total_files += 1;
        self.total_bytes += record.size;

        if record.has_digest_failures() {
            self.digest_failures += 1;
        }

        if self.largest_file.as_ref().is_none_or(|(_, s)| record.size > *s) {
            self.largest_file = Some((record.path.clone(), record.size));
        }
    }
}

/// Everything the scanning engine produces for one run.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Finished records, in completion order.
    pub records: Vec<FileRecord>,
    /// Traversal and dispatch warnings.
    pub warnings: Vec<ScanWarning>,
    /// Run statistics.
    pub summary: ScanSummary,
}

/// The complete report written at the end of a run.
///
/// `file_data` order reflects digest completion order and is not
/// deterministic between runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Host descriptor.
    pub host_data: HostInfo,
    /// Configuration the run used.
    pub flag_data: RunConfig,
    /// One record per regular file.
    pub file_data: Vec<FileRecord>,
    /// Run statistics.
    pub scan_summary: ScanSummary,
    /// Warnings encountered during the run.
    pub warnings: Vec<ScanWarning>,
}

impl RunReport {
    /// Assemble a report from the run's parts.
    pub fn new(host_data: HostInfo, flag_data: RunConfig, outcome: ScanOutcome) -> Self {
        Self {
            host_data,
            flag_data,
            file_data: outcome.records,
            scan_summary: outcome.summary,
            warnings: outcome.warnings,
        }
    }

    /// Get the total number of records.
    pub fn total_files(&self) -> usize {
        self.file_data.len()
    }
}
