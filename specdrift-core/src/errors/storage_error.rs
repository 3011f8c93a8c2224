//! Trend store errors.

use super::error_code::{self, SpecdriftErrorCode};

/// Errors from the append-only trend store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Duplicate run id: {run_id}")]
    DuplicateRun { run_id: String },

    #[error("Report not found: {run_id}")]
    ReportNotFound { run_id: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },
}

impl SpecdriftErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateRun { .. } => error_code::DUPLICATE_RUN,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
