//! Stable machine-readable error codes.

/// Trait mapping every error variant to a stable code string.
/// Codes are part of the external contract (JSON output, CI parsing)
/// and must never change once published.
pub trait SpecdriftErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const EXTRACT_ERROR: &str = "SPECDRIFT_EXTRACT";
pub const REGISTRY_ERROR: &str = "SPECDRIFT_REGISTRY";
pub const PROVIDER_ERROR: &str = "SPECDRIFT_PROVIDER";
pub const PROVIDER_TIMEOUT: &str = "SPECDRIFT_PROVIDER_TIMEOUT";
pub const STORAGE_ERROR: &str = "SPECDRIFT_STORAGE";
pub const DUPLICATE_RUN: &str = "SPECDRIFT_DUPLICATE_RUN";
pub const CONFIG_ERROR: &str = "SPECDRIFT_CONFIG";
pub const SCHEDULE_ERROR: &str = "SPECDRIFT_SCHEDULE";
