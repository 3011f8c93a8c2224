//! Error handling for Specdrift.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod extract_error;
pub mod pipeline_error;
pub mod provider_error;
pub mod registry_error;
pub mod schedule_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::SpecdriftErrorCode;
pub use extract_error::ExtractError;
pub use pipeline_error::PipelineError;
pub use provider_error::ProviderError;
pub use registry_error::{RegistryError, RuleLoadIssue};
pub use schedule_error::ScheduleError;
pub use storage_error::StorageError;
