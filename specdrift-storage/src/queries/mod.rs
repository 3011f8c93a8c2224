//! Queries over the report history tables.

pub mod reports;
pub mod scores;

use rusqlite::Error as SqliteError;
use specdrift_core::errors::StorageError;

pub(crate) fn sqlite_err(e: SqliteError) -> StorageError {
    StorageError::Sqlite {
        message: e.to_string(),
    }
}
