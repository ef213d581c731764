//! Single-writer result collection.

use std::time::Instant;

use tokio::sync::broadcast;

use fsinventory_core::{FileRecord, ScanSummary};

use crate::progress::ScanProgress;

/// Records between progress broadcasts.
pub const PROGRESS_INTERVAL: u64 = 256;

/// Collects finished records for one run.
///
/// Owned by a single thread; concurrent producers reach it through a channel,
/// so every append is a plain push. Records are kept in arrival order, which
/// is digest completion order and not stable between runs.
#[derive(Debug)]
pub struct Aggregator {
    records: Vec<FileRecord>,
    summary: ScanSummary,
    started: Instant,
    progress_tx: Option<broadcast::Sender<ScanProgress>>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            summary: ScanSummary::new(),
            started: Instant::now(),
            progress_tx: None,
        }
    }

    /// Broadcast progress snapshots on this channel.
    pub fn with_progress(mut self, progress_tx: broadcast::Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Append a finished record.
    pub fn append(&mut self, record: FileRecord) {
        debug_assert!(!record.is_pending(), "pending record reached the aggregator");

        self.summary.record_file(&record);
        self.records.push(record);

        if self.summary.total_files % PROGRESS_INTERVAL == 0 {
            self.emit(false);
        }
    }

    /// Count a descriptor rejected as a duplicate.
    pub fn record_duplicate(&mut self) {
        self.summary.duplicates_rejected += 1;
    }

    /// Count a descriptor dropped by an abort.
    pub fn record_skipped(&mut self) {
        self.summary.skipped_on_abort += 1;
    }

    /// Close the collection, emitting a final progress snapshot.
    pub fn finish(self) -> (Vec<FileRecord>, ScanSummary) {
        self.emit(true);
        (self.records, self.summary)
    }

    fn emit(&self, finished: bool) {
        let Some(tx) = &self.progress_tx else {
            return;
        };
        let current_path = self
            .records
            .last()
            .map(|r| r.path.clone())
            .unwrap_or_default();

        // No subscribers is fine.
        let _ = tx.send(ScanProgress {
            files_digested: self.summary.total_files,
            bytes_digested: self.summary.total_bytes,
            digest_failures: self.summary.digest_failures,
            current_path,
            elapsed: self.started.elapsed(),
            finished,
        });
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
