//! Host information via sysinfo.

use std::thread;

use sysinfo::System;
use tracing::debug;

use fsinventory_core::HostInfo;

/// Describe the current machine.
///
/// Never fails: anything the platform does not report is left empty.
pub fn collect_host_info() -> HostInfo {
    let info = HostInfo {
        hostname: System::host_name(),
        uptime: nonzero(System::uptime()),
        boot_time: nonzero(System::boot_time()),
        os: System::name(),
        platform: nonempty(System::distribution_id()),
        platform_family: nonempty(System::distribution_id_like().join(",")),
        platform_version: System::os_version(),
        kernel_version: System::kernel_version(),
        kernel_arch: nonempty(System::cpu_arch()),
        cpu_count: thread::available_parallelism().ok().map(|n| n.get()),
    };

    debug!(?info, "Collected host information");
    info
}

/// sysinfo reports 0 where a value is unavailable.
fn nonzero(value: u64) -> Option<u64> {
    (value > 0).then_some(value)
}

fn nonempty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}
