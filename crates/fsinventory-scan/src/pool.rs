//! Bounded digest worker pool.
//!
//! A fixed number of long-lived workers pull descriptors from a bounded queue,
//! digest them, and hand the finished records to a single aggregator thread.
//! The caller's thread feeds the queue, so descriptor production overlaps with
//! digesting while at most `concurrency` digests run at once.

use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fsinventory_core::{FileRecord, ScanError, ScanSummary, ScanWarning};

use crate::aggregator::Aggregator;
use crate::claims::PathClaims;
use crate::digest::Digester;
use crate::progress::ScanProgress;

/// What a worker reports back for one descriptor.
enum WorkerEvent {
    Finished(FileRecord),
    Duplicate(PathBuf),
    Skipped,
}

/// Result of draining a descriptor sequence through the pool.
#[derive(Debug)]
pub struct PoolOutcome {
    /// Finished records in completion order.
    pub records: Vec<FileRecord>,
    /// Record statistics; `aborted`, duplicate, and skip counts are filled in.
    pub summary: ScanSummary,
    /// Duplicate-descriptor warnings.
    pub warnings: Vec<ScanWarning>,
    /// Descriptors handed to the queue.
    pub dispatched: u64,
}

/// Fixed-size pool of digest workers.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
    cancel: CancellationToken,
    progress_tx: Option<broadcast::Sender<ScanProgress>>,
    log_files: bool,
}

impl WorkerPool {
    /// Create a pool with `concurrency` workers.
    pub fn new(concurrency: usize) -> Result<Self, ScanError> {
        if concurrency == 0 {
            return Err(ScanError::InvalidConfig {
                message: "Concurrency must be at least 1".to_string(),
            });
        }
        Ok(Self {
            concurrency,
            cancel: CancellationToken::new(),
            progress_tx: None,
            log_files: false,
        })
    }

    /// Stop dispatching when this token is cancelled.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Broadcast progress snapshots on this channel.
    pub fn with_progress(mut self, progress_tx: broadcast::Sender<ScanProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    /// Log every processed file at info level instead of debug.
    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.log_files = enabled;
        self
    }

    /// Number of workers.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Digest every descriptor and collect the finished records.
    ///
    /// Returns after the producer, every worker, and the aggregator have
    /// finished. Per-file digest failures are kept on their records.
    pub fn run<I, D>(&self, descriptors: I, digester: &D) -> Result<PoolOutcome, ScanError>
    where
        I: IntoIterator<Item = FileRecord>,
        D: Digester + ?Sized,
    {
        let claims = PathClaims::new();

        thread::scope(|scope| {
            let (job_tx, job_rx) = crossbeam_channel::bounded::<FileRecord>(self.concurrency);
            let (event_tx, event_rx) = crossbeam_channel::unbounded::<WorkerEvent>();

            let mut aggregator = Aggregator::new();
            if let Some(tx) = &self.progress_tx {
                aggregator = aggregator.with_progress(tx.clone());
            }

            let collector = thread::Builder::new()
                .name("fsinv-aggregate".to_string())
                .spawn_scoped(scope, move || collect(aggregator, event_rx))
                .map_err(|source| ScanError::Spawn { source })?;

            for id in 0..self.concurrency {
                let jobs = job_rx.clone();
                let events = event_tx.clone();
                let claims = &claims;
                thread::Builder::new()
                    .name(format!("fsinv-digest-{id}"))
                    .spawn_scoped(scope, move || {
                        self.work(id, jobs, events, digester, claims);
                    })
                    .map_err(|source| ScanError::Spawn { source })?;
            }
            drop(job_rx);
            drop(event_tx);

            let mut dispatched: u64 = 0;
            let mut interrupted = false;
            for record in descriptors {
                if self.cancel.is_cancelled() {
                    interrupted = true;
                    break;
                }
                if job_tx.send(record).is_err() {
                    break;
                }
                dispatched += 1;
            }
            drop(job_tx);

            if interrupted {
                info!(dispatched, "Abort requested, draining in-flight digests");
            }

            let (records, mut summary, warnings) = match collector.join() {
                Ok(collected) => collected,
                Err(payload) => std::panic::resume_unwind(payload),
            };
            summary.aborted = interrupted || summary.skipped_on_abort > 0;

            Ok(PoolOutcome {
                records,
                summary,
                warnings,
                dispatched,
            })
        })
    }

    fn work<D: Digester + ?Sized>(
        &self,
        id: usize,
        jobs: Receiver<FileRecord>,
        events: Sender<WorkerEvent>,
        digester: &D,
        claims: &PathClaims,
    ) {
        for record in jobs.iter() {
            let event = if self.cancel.is_cancelled() {
                WorkerEvent::Skipped
            } else if !claims.claim(&record.path) {
                WorkerEvent::Duplicate(record.path)
            } else {
                if self.log_files {
                    info!(worker = id, path = %record.path.display(), "Processing file");
                } else {
                    debug!(worker = id, path = %record.path.display(), "Processing file");
                }

                let digests = digester.digest(&record.path);
                if let Some((kind, failure)) = digests.failures().next() {
                    warn!(
                        path = %record.path.display(),
                        kind = %kind,
                        "Digest failed: {}",
                        failure.message
                    );
                }
                WorkerEvent::Finished(record.with_digests(digests))
            };

            if events.send(event).is_err() {
                break;
            }
        }
    }
}

/// Aggregator thread body: the only writer of the result collection.
fn collect(
    mut aggregator: Aggregator,
    events: Receiver<WorkerEvent>,
) -> (Vec<FileRecord>, ScanSummary, Vec<ScanWarning>) {
    let mut warnings = Vec::new();

    for event in events.iter() {
        match event {
            WorkerEvent::Finished(record) => aggregator.append(record),
            WorkerEvent::Duplicate(path) => {
                let warning = ScanWarning::duplicate_path(path);
                warn!(path = %warning.path.display(), "{}", warning.message);
                aggregator.record_duplicate();
                warnings.push(warning);
            }
            WorkerEvent::Skipped => aggregator.record_skipped(),
        }
    }

    let (records, summary) = aggregator.finish();
    (records, summary, warnings)
}
