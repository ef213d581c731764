//! Traversal and digest engine for fsinventory.
//!
//! This crate walks a directory with jwalk and computes content digests for
//! every regular file on a bounded pool of worker threads.
//!
//! # Overview
//!
//! A run has three stages that overlap in time:
//!
//! - **Discovery**: [`FileWalker`] lazily yields one pending record per file
//! - **Digesting**: [`WorkerPool`] hands records to at most `concurrency` workers
//! - **Collection**: a single [`Aggregator`] appends finished records
//!
//! Each file is read once no matter how many digest kinds are requested.
//!
//! # Example
//!
//! ```rust,no_run
//! use fsinventory_scan::{InventoryScanner, RunConfig};
//!
//! let config = RunConfig::new("/path/to/scan");
//! let scanner = InventoryScanner::new();
//! let outcome = scanner.scan(&config).unwrap();
//!
//! println!("Total files: {}", outcome.summary.total_files);
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use fsinventory_scan::InventoryScanner;
//!
//! let scanner = InventoryScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         println!("Digested {} files", progress.files_digested);
//!     }
//! });
//! ```

mod aggregator;
mod claims;
mod digest;
mod pool;
mod progress;
mod scanner;
mod walker;

pub use aggregator::{Aggregator, PROGRESS_INTERVAL};
pub use claims::PathClaims;
pub use digest::{DEFAULT_BUFFER_SIZE, DigestEngine, Digester};
pub use pool::{PoolOutcome, WorkerPool};
pub use progress::ScanProgress;
pub use scanner::InventoryScanner;
pub use walker::{FileWalker, Walk};

// Re-export core types for convenience
pub use fsinventory_core::{
    DigestKind, DigestSet, FileRecord, RunConfig, ScanError, ScanOutcome, ScanSummary,
    ScanWarning, WarningKind,
};
