//! Code-fact provider errors.

use super::error_code::{self, SpecdriftErrorCode};

/// Errors at the boundary to the external code-fact provider.
///
/// `Timeout` is recoverable: the run proceeds with the facts obtained so
/// far and a `ProviderTimeout` warning on the report.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Provider snapshot not found: {path}")]
    SnapshotNotFound { path: String },

    #[error("Provider payload malformed: {message}")]
    MalformedPayload { message: String },
}

impl SpecdriftErrorCode for ProviderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::PROVIDER_TIMEOUT,
            _ => error_code::PROVIDER_ERROR,
        }
    }
}
