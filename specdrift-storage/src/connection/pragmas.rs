//! Connection pragmas for the trend store.

use rusqlite::Connection;
use specdrift_core::errors::StorageError;

/// Pragmas for the write connection: WAL for concurrent readers,
/// NORMAL sync (WAL makes FULL unnecessary), a busy timeout so the
/// writer waits out short reader bursts instead of failing.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}

/// Pragmas for pooled read connections: query-only, same busy timeout.
pub fn apply_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA query_only = ON;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}
