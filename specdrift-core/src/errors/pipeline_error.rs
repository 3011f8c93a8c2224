//! Pipeline errors.

use super::error_code::SpecdriftErrorCode;
use super::{
    ConfigError, ExtractError, ProviderError, RegistryError, ScheduleError, StorageError,
};

/// Errors that can occur during a compliance run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler error: {0}")]
    Schedule(#[from] ScheduleError),
}

impl SpecdriftErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Extract(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
            Self::Provider(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Schedule(e) => e.error_code(),
        }
    }
}
