//! Logger configuration

use serde::{Deserialize, Serialize};

/// Configuration of the acquisition loop. The interval is configuration,
/// not behavior: it only controls the delay between unmounting and the
/// next mount.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct LoggerConfig<'a> {
    /// Mount point of the removable medium.
    pub mount_point: &'a str,
    /// Delay between the end of one cycle and the start of the next.
    pub cycle_interval_ms: u64,
}

impl Default for LoggerConfig<'_> {
    fn default() -> Self {
        Self {
            mount_point: "/SD:",
            cycle_interval_ms: 3000,
        }
    }
}
