//! The code-fact provider boundary.
//!
//! Fact retrieval is the only suspension point in a run that depends on
//! an external system. It happens once, before evaluation begins, and is
//! time-bounded: on timeout the run proceeds with the facts obtained so
//! far plus a `ProviderTimeout` warning instead of failing outright.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use specdrift_core::errors::ProviderError;
use specdrift_core::model::RunWarning;

use super::RawCodeFact;

/// Source of raw code facts. The extraction itself (AST analysis) is
/// external; implementations only deliver its output.
pub trait CodeFactProvider: Send + Sync {
    /// Fetch raw facts for the given modules. An empty scope means all.
    fn fetch(&self, modules: &[String]) -> Result<Vec<RawCodeFact>, ProviderError>;
}

/// Reads a JSON snapshot file written by the external provider:
/// a top-level array of raw fact records.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CodeFactProvider for JsonFileProvider {
    fn fetch(&self, modules: &[String]) -> Result<Vec<RawCodeFact>, ProviderError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|_| ProviderError::SnapshotNotFound {
                path: self.path.display().to_string(),
            })?;
        let mut records: Vec<RawCodeFact> =
            serde_json::from_str(&content).map_err(|e| ProviderError::MalformedPayload {
                message: e.to_string(),
            })?;
        if !modules.is_empty() {
            records.retain(|r| modules.iter().any(|m| *m == r.module));
        }
        Ok(records)
    }
}

/// Outcome of a time-bounded fetch.
pub struct FetchOutcome {
    pub records: Vec<RawCodeFact>,
    /// Set when the fetch was degraded (timeout); the run continues.
    pub warning: Option<RunWarning>,
}

/// Run `provider.fetch` on a detached worker thread, bounded by `timeout`.
///
/// On timeout the worker is abandoned (it may finish later and its
/// result is discarded) and the run proceeds with no records plus a
/// `ProviderTimeout` warning. Hard provider errors still propagate.
pub fn fetch_bounded(
    provider: std::sync::Arc<dyn CodeFactProvider>,
    modules: &[String],
    timeout: Duration,
) -> Result<FetchOutcome, ProviderError> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let scope = modules.to_vec();

    std::thread::spawn(move || {
        // Receiver may be gone after a timeout; a send failure is fine.
        let _ = tx.send(provider.fetch(&scope));
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(records)) => Ok(FetchOutcome {
            records,
            warning: None,
        }),
        Ok(Err(e)) => Err(e),
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "provider fetch timed out");
            Ok(FetchOutcome {
                records: Vec::new(),
                warning: Some(RunWarning::ProviderTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ProviderError::MalformedPayload {
            message: "provider worker dropped without a result".to_string(),
        }),
    }
}
