//! Run progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Progress snapshot broadcast while a run is in progress.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Records finished so far.
    pub files_digested: u64,
    /// Bytes covered by finished records.
    pub bytes_digested: u64,
    /// Finished records with failed digests.
    pub digest_failures: u64,
    /// Most recently finished path.
    pub current_path: PathBuf,
    /// Time elapsed since the pool started.
    pub elapsed: Duration,
    /// True for the last snapshot of a run.
    pub finished: bool,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_digested: 0,
            bytes_digested: 0,
            digest_failures: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Calculate rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_digested as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate rate in bytes per second.
    pub fn bytes_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.bytes_digested as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}
