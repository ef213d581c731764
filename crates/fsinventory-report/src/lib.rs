//! Report collaborators for fsinventory.
//!
//! - [`collect_host_info`] describes the machine a run executes on
//! - [`ReportWriter`] writes a finished [`RunReport`] as pretty JSON, atomically

mod error;
mod host;
mod writer;

pub use error::ReportError;
pub use host::collect_host_info;
pub use writer::ReportWriter;

pub use fsinventory_core::{HostInfo, RunReport};
