//! Incremental scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the incremental scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Debounce window in milliseconds for coalescing change signals.
    /// Default: 250.
    pub debounce_ms: Option<u64>,
}

impl ScheduleConfig {
    /// Returns the effective debounce window, defaulting to 250ms.
    pub fn effective_debounce_ms(&self) -> u64 {
        self.debounce_ms.unwrap_or(250)
    }
}
