//! Rule engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the rule engine and provider boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the rule registry TOML file. Built-in rules when unset.
    pub rules_file: Option<String>,
    /// Provider fetch timeout in milliseconds. Default: 5000.
    pub provider_timeout_ms: Option<u64>,
    /// Worker pool size for module-level parallelism. Default: available
    /// parallelism capped at 8.
    pub workers: Option<usize>,
}

impl EngineConfig {
    /// Returns the effective provider timeout, defaulting to 5000ms.
    pub fn effective_provider_timeout_ms(&self) -> u64 {
        self.provider_timeout_ms.unwrap_or(5000)
    }

    /// Returns the effective worker count.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
        })
    }
}
