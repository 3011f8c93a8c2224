//! Recording and loading whole reports.

use rusqlite::{params, Connection};
use specdrift_core::errors::StorageError;
use specdrift_core::model::{
    Gap, GapType, ModuleScore, Priority, Report, RunId, RunStatus, RunWarning,
};
use tracing::debug;

use super::sqlite_err;
use crate::connection::Database;

/// Record a completed report as one atomic append. A run id that is
/// already recorded is rejected; history rows are never overwritten.
pub fn record_report(db: &Database, report: &Report) -> Result<(), StorageError> {
    db.with_writer(|conn| {
        conn.execute_batch("BEGIN IMMEDIATE;").map_err(sqlite_err)?;
        match insert_all(conn, report) {
            Ok(()) => {
                conn.execute_batch("COMMIT;").map_err(sqlite_err)?;
                debug!(run_id = %report.run_id.as_str(), gaps = report.gaps.len(), "report recorded");
                Ok(())
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK;");
                Err(e)
            }
        }
    })
}

fn insert_all(conn: &Connection, report: &Report) -> Result<(), StorageError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO reports
                (run_id, recorded_at, spec_revision, code_revision, status, gap_count, p1_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.run_id.as_str(),
                report.timestamp,
                report.spec_revision,
                report.code_revision,
                report.status.as_str(),
                report.gaps.len() as i64,
                report.p1_count() as i64,
            ],
        )
        .map_err(sqlite_err)?;
    if inserted == 0 {
        return Err(StorageError::DuplicateRun {
            run_id: report.run_id.as_str().to_string(),
        });
    }

    let mut gap_stmt = conn
        .prepare_cached(
            "INSERT INTO report_gaps
                (run_id, position, gap_type, priority, module, subject, description, decision_options)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(sqlite_err)?;
    for (position, gap) in report.gaps.iter().enumerate() {
        let options = serde_json::to_string(&gap.decision_options).map_err(|e| {
            StorageError::Sqlite {
                message: format!("serialize decision options: {e}"),
            }
        })?;
        gap_stmt
            .execute(params![
                report.run_id.as_str(),
                position as i64,
                gap.gap_type.as_str(),
                gap.priority.as_str(),
                gap.module,
                gap.subject,
                gap.description,
                options,
            ])
            .map_err(sqlite_err)?;
    }

    let mut score_stmt = conn
        .prepare_cached(
            "INSERT INTO module_scores
                (run_id, module, score, gaps_weighted, rules_weighted, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sqlite_err)?;
    for score in &report.module_scores {
        score_stmt
            .execute(params![
                report.run_id.as_str(),
                score.module,
                score.score,
                score.gaps_weighted as i64,
                score.rules_weighted as i64,
                report.timestamp,
            ])
            .map_err(sqlite_err)?;
    }

    let mut warning_stmt = conn
        .prepare_cached(
            "INSERT INTO report_warnings (run_id, position, payload) VALUES (?1, ?2, ?3)",
        )
        .map_err(sqlite_err)?;
    for (position, warning) in report.warnings.iter().enumerate() {
        let payload = serde_json::to_string(warning).map_err(|e| StorageError::Sqlite {
            message: format!("serialize warning: {e}"),
        })?;
        warning_stmt
            .execute(params![report.run_id.as_str(), position as i64, payload])
            .map_err(sqlite_err)?;
    }

    Ok(())
}

/// Load one recorded report by run id.
pub fn load_report(db: &Database, run_id: &str) -> Result<Report, StorageError> {
    db.read(|conn| {
        let (timestamp, spec_revision, code_revision, status): (i64, String, String, String) =
            conn.query_row(
                "SELECT recorded_at, spec_revision, code_revision, status
                 FROM reports WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StorageError::ReportNotFound {
                    run_id: run_id.to_string(),
                },
                other => sqlite_err(other),
            })?;

        let status = RunStatus::parse_str(&status).ok_or_else(|| StorageError::Sqlite {
            message: format!("unknown run status '{status}'"),
        })?;

        let gaps = load_gaps(conn, run_id)?;
        let module_scores = load_scores(conn, run_id)?;
        let warnings = load_warnings(conn, run_id)?;
        let modules = module_scores.iter().map(|s| s.module.clone()).collect();

        Ok(Report {
            run_id: RunId::from_string(run_id.to_string()),
            timestamp,
            spec_revision,
            code_revision,
            modules,
            gaps,
            module_scores,
            warnings,
            status,
        })
    })
}

fn load_gaps(conn: &Connection, run_id: &str) -> Result<Vec<Gap>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT gap_type, priority, module, subject, description, decision_options
             FROM report_gaps WHERE run_id = ?1 ORDER BY position",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(sqlite_err)?;

    let mut gaps = Vec::new();
    for row in rows {
        let (gap_type, priority, module, subject, description, options) =
            row.map_err(sqlite_err)?;
        let gap_type = GapType::parse_str(&gap_type).ok_or_else(|| StorageError::Sqlite {
            message: format!("unknown gap type '{gap_type}'"),
        })?;
        let priority = Priority::parse_str(&priority).ok_or_else(|| StorageError::Sqlite {
            message: format!("unknown priority '{priority}'"),
        })?;
        let decision_options =
            serde_json::from_str(&options).map_err(|e| StorageError::Sqlite {
                message: format!("decode decision options: {e}"),
            })?;
        gaps.push(Gap {
            gap_type,
            priority,
            module,
            subject,
            description,
            decision_options,
        });
    }
    Ok(gaps)
}

fn load_scores(conn: &Connection, run_id: &str) -> Result<Vec<ModuleScore>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT module, score, gaps_weighted, rules_weighted
             FROM module_scores WHERE run_id = ?1 ORDER BY module",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id], |row| {
            Ok(ModuleScore {
                module: row.get(0)?,
                score: row.get(1)?,
                gaps_weighted: row.get::<_, i64>(2)? as u32,
                rules_weighted: row.get::<_, i64>(3)? as u32,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

fn load_warnings(conn: &Connection, run_id: &str) -> Result<Vec<RunWarning>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT payload FROM report_warnings WHERE run_id = ?1 ORDER BY position",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![run_id], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;

    let mut warnings = Vec::new();
    for payload in rows {
        let payload = payload.map_err(sqlite_err)?;
        warnings.push(
            serde_json::from_str(&payload).map_err(|e| StorageError::Sqlite {
                message: format!("decode warning: {e}"),
            })?,
        );
    }
    Ok(warnings)
}

/// Most recent run ids, newest first.
pub fn recent_run_ids(db: &Database, limit: usize) -> Result<Vec<String>, StorageError> {
    db.read(|conn| {
        let mut stmt = conn
            .prepare_cached("SELECT run_id FROM reports ORDER BY run_id DESC LIMIT ?1")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| row.get(0))
            .map_err(sqlite_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
    })
}
