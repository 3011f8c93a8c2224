//! Incremental scheduler errors.

use super::error_code::{self, SpecdriftErrorCode};

/// Errors from the incremental scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Module {module} is already checking")]
    AlreadyChecking { module: String },
}

impl SpecdriftErrorCode for ScheduleError {
    fn error_code(&self) -> &'static str {
        error_code::SCHEDULE_ERROR
    }
}
