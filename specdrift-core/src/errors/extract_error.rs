//! Specification extraction errors.
//!
//! Malformed sections inside a readable document are *not* errors — they
//! become `RunWarning::Parse` entries and extraction continues. Only an
//! unreadable corpus surfaces here.

use super::error_code::{self, SpecdriftErrorCode};

/// Errors that can occur while reading the specification corpus.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Corpus directory not found: {path}")]
    CorpusNotFound { path: String },

    #[error("Failed to read document {path}: {message}")]
    DocumentUnreadable { path: String, message: String },

    #[error("No documents found under {path}")]
    EmptyCorpus { path: String },
}

impl SpecdriftErrorCode for ExtractError {
    fn error_code(&self) -> &'static str {
        error_code::EXTRACT_ERROR
    }
}
