//! Rule registry errors — collect-and-report, not fail-fast.

use super::error_code::{self, SpecdriftErrorCode};

/// A single invalid rule skipped during registry load.
/// The rest of the registry still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleLoadIssue {
    pub rule_id: String,
    pub message: String,
}

/// Errors that make the whole registry unusable.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry file not found: {path}")]
    FileNotFound { path: String },

    #[error("Registry TOML parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Registry contains no valid rules ({issue_count} issues)")]
    NoValidRules { issue_count: usize },
}

impl SpecdriftErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        error_code::REGISTRY_ERROR
    }
}
