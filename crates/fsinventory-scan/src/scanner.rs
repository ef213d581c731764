//! Run orchestration: walk, digest, collect.

use std::time::Instant;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fsinventory_core::{RunConfig, ScanError, ScanOutcome};

use crate::digest::{DigestEngine, Digester};
use crate::pool::WorkerPool;
use crate::progress::ScanProgress;
use crate::walker::FileWalker;

/// Inventory scanner: drives one run from a [`RunConfig`] to a [`ScanOutcome`].
pub struct InventoryScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: CancellationToken,
}

impl InventoryScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to run progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Token that aborts the run when cancelled.
    ///
    /// Cancelling stops discovery; digests already in flight complete and
    /// appear in the outcome.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run an inventory with the digest kinds named in `config`.
    pub fn scan(&self, config: &RunConfig) -> Result<ScanOutcome, ScanError> {
        let engine = DigestEngine::new(config.digest_kinds());
        self.scan_with(config, &engine)
    }

    /// Run an inventory using a custom digester.
    pub fn scan_with<D: Digester + ?Sized>(
        &self,
        config: &RunConfig,
        digester: &D,
    ) -> Result<ScanOutcome, ScanError> {
        let start = Instant::now();

        if config.concurrency == 0 {
            return Err(ScanError::InvalidConfig {
                message: "Concurrency must be at least 1".to_string(),
            });
        }
        let concurrency = config.effective_concurrency();
        if concurrency != config.concurrency {
            warn!(
                requested = config.concurrency,
                used = concurrency,
                "Concurrency clamped"
            );
        }

        let mut walk = FileWalker::new(&config.start_dir, config.recurse).walk()?;
        let pool = WorkerPool::new(concurrency)?
            .with_cancel(self.cancel.clone())
            .with_progress(self.progress_tx.clone())
            .with_file_logging(config.debug);
        info!(
            root = %walk.root().display(),
            recurse = config.recurse,
            concurrency = pool.concurrency(),
            digests = ?digester.kinds(),
            "Starting inventory"
        );

        let pooled = pool.run(&mut walk, digester)?;

        let mut warnings = walk.take_warnings();
        warnings.extend(pooled.warnings);

        let mut summary = pooled.summary;
        summary.warnings = warnings.len() as u64;
        summary.scan_duration = start.elapsed();

        info!(
            discovered = walk.discovered(),
            files = summary.total_files,
            bytes = summary.total_bytes,
            failures = summary.digest_failures,
            warnings = summary.warnings,
            aborted = summary.aborted,
            elapsed_ms = summary.scan_duration.as_millis() as u64,
            "Inventory finished"
        );

        Ok(ScanOutcome {
            records: pooled.records,
            warnings,
            summary,
        })
    }
}

impl Default for InventoryScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsinventory_core::DigestKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_small_tree() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub/b.txt"), "").unwrap();

        let config = RunConfig::builder()
            .start_dir(temp.path())
            .concurrency(2usize)
            .build()
            .unwrap();
        let outcome = InventoryScanner::new().scan(&config).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.summary.total_files, 2);
        assert_eq!(outcome.summary.total_bytes, 5);
        assert!(!outcome.summary.aborted);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_clamped_concurrency_still_runs() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one"), "1").unwrap();

        let mut config = RunConfig::new(temp.path());
        config.concurrency = 10_000;
        config.digests = vec![DigestKind::Sha256];

        let outcome = InventoryScanner::new().scan(&config).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].digests.len(), 1);
    }

    #[test]
    fn test_zero_concurrency_is_error() {
        let temp = TempDir::new().unwrap();
        let mut config = RunConfig::new(temp.path());
        config.concurrency = 0;

        let result = InventoryScanner::new().scan(&config);
        assert!(matches!(result, Err(ScanError::InvalidConfig { .. })));
    }

    #[test]
    fn test_cancelled_scan_is_aborted() {
        let temp = TempDir::new().unwrap();
        for i in 0..10 {
            fs::write(temp.path().join(format!("f{i}")), "x").unwrap();
        }

        let scanner = InventoryScanner::new();
        scanner.cancel_token().cancel();
        let outcome = scanner.scan(&RunConfig::new(temp.path())).unwrap();

        assert!(outcome.summary.aborted);
        assert!(outcome.records.is_empty());
    }
}
