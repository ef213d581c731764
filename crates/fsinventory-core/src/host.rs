//! Host descriptor carried in the report.

use serde::{Deserialize, Serialize};

/// Descriptor of the machine a run executed on.
///
/// Filled by a collaborator and passed through untouched. Fields the platform
/// cannot provide stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: Option<String>,
    /// Seconds since boot.
    pub uptime: Option<u64>,
    /// Boot time as seconds since the Unix epoch.
    pub boot_time: Option<u64>,
    pub os: Option<String>,
    /// Distribution identifier, e.g. `ubuntu`.
    pub platform: Option<String>,
    /// Distributions the platform derives from, comma separated.
    pub platform_family: Option<String>,
    pub platform_version: Option<String>,
    pub kernel_version: Option<String>,
    pub kernel_arch: Option<String>,
    pub cpu_count: Option<usize>,
}
