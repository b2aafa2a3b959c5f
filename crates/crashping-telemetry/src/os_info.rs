//! Operating system information for `client_info`
//!
//! Never includes hostname or username.

use serde::{Deserialize, Serialize};

/// Non-identifying operating system information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub os: String,
    pub os_version: String,
    pub architecture: String,
}

impl OsInfo {
    /// Collect OS information from the current system.
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            os_version: read_kernel_version(),
            architecture: std::env::consts::ARCH.to_string(),
        }
    }
}

fn read_kernel_version() -> String {
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}
