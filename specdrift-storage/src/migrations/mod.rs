//! Schema migrations, applied in order inside one transaction each.

mod v001_reports;

use rusqlite::Connection;
use specdrift_core::errors::StorageError;
use tracing::debug;

const MIGRATIONS: &[(u32, &str)] = &[(1, v001_reports::MIGRATION_SQL)];

/// Apply any migrations above the current schema version.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        ) STRICT;",
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        debug!(version, "applying migration");
        apply_migration(conn, *version, sql)?;
    }
    Ok(())
}

fn apply_migration(conn: &Connection, version: u32, sql: &str) -> Result<(), StorageError> {
    let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
        version,
        message: e.to_string(),
    };
    conn.execute_batch("BEGIN IMMEDIATE;").map_err(failed)?;
    let result = conn.execute_batch(sql).and_then(|()| {
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, unixepoch())",
            [version],
        )
        .map(|_| ())
    });
    match result {
        Ok(()) => conn.execute_batch("COMMIT;").map_err(failed),
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK;");
            Err(failed(e))
        }
    }
}

/// Current schema version (0 when unmigrated).
pub fn schema_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::Sqlite {
        message: e.to_string(),
    })
}
