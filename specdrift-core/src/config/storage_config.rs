//! Trend store configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the trend store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path. Default: ".specdrift/trend.db".
    pub db_path: Option<String>,
    /// Retain reports for this many days. Default: 90. Zero disables
    /// pruning.
    pub retention_days: Option<u32>,
}

impl StorageConfig {
    /// Returns the effective database path.
    pub fn effective_db_path(&self) -> &str {
        self.db_path.as_deref().unwrap_or(".specdrift/trend.db")
    }

    /// Returns the effective retention window, defaulting to 90 days.
    pub fn effective_retention_days(&self) -> u32 {
        self.retention_days.unwrap_or(90)
    }
}
