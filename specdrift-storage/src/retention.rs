//! History retention.
//!
//! Reports older than the retention window are deleted with their
//! dependent rows via cascade. The newest report overall is always
//! kept, so a long-idle project never loses its last known state.

use rusqlite::params;
use serde::Serialize;
use specdrift_core::errors::StorageError;
use tracing::info;

use crate::connection::Database;
use crate::queries::sqlite_err;

/// What a retention sweep removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetentionReport {
    pub reports_deleted: u64,
}

/// Delete reports recorded more than `retention_days` ago, keeping the
/// single newest report regardless of age. Runs in one transaction.
pub fn apply_retention(
    db: &Database,
    retention_days: u32,
) -> Result<RetentionReport, StorageError> {
    db.with_writer(|conn| {
        conn.execute_batch("BEGIN IMMEDIATE;").map_err(sqlite_err)?;
        let result = conn.execute(
            "DELETE FROM reports
             WHERE recorded_at < unixepoch() - (?1 * 86400)
             AND run_id != (SELECT run_id FROM reports ORDER BY run_id DESC LIMIT 1)",
            params![retention_days],
        );
        match result {
            Ok(deleted) => {
                conn.execute_batch("COMMIT;").map_err(sqlite_err)?;
                if deleted > 0 {
                    info!(deleted, retention_days, "retention sweep removed reports");
                }
                Ok(RetentionReport {
                    reports_deleted: deleted as u64,
                })
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK;");
                Err(sqlite_err(e))
            }
        }
    })
}
