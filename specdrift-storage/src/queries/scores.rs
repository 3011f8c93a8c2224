//! Module score trends over time.

use rusqlite::params;
use specdrift_core::errors::StorageError;

use super::sqlite_err;
use crate::connection::Database;

/// One point of a module's score history. `score` is None for runs
/// where the module failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePoint {
    pub run_id: String,
    pub score: Option<f64>,
    pub recorded_at: i64,
}

/// Score history for one module over the last `days` days, oldest first.
pub fn score_history(
    db: &Database,
    module: &str,
    days: u32,
) -> Result<Vec<ScorePoint>, StorageError> {
    db.read(|conn| {
        let mut stmt = conn
            .prepare_cached(
                "SELECT run_id, score, recorded_at FROM module_scores
                 WHERE module = ?1
                 AND recorded_at >= unixepoch() - (?2 * 86400)
                 ORDER BY recorded_at ASC, run_id ASC",
            )
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![module, days], |row| {
                Ok(ScorePoint {
                    run_id: row.get(0)?,
                    score: row.get(1)?,
                    recorded_at: row.get(2)?,
                })
            })
            .map_err(sqlite_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
    })
}
