//! Core types for fsinventory.
//!
//! This crate provides the data model shared by the scanning engine and the
//! report collaborators: file records and their digest sets, the run
//! configuration, the final report, and the error and warning types.

mod config;
mod error;
mod host;
mod record;
mod report;

pub use config::{DEFAULT_CONCURRENCY, DEFAULT_OUTPUT, MAX_CONCURRENCY, RunConfig, RunConfigBuilder};
pub use error::{DigestError, DigestFailure, FailureKind, ScanError, ScanWarning, WarningKind};
pub use host::HostInfo;
pub use record::{DigestKind, DigestOutcome, DigestSet, FileRecord};
pub use report::{RunReport, ScanOutcome, ScanSummary};
