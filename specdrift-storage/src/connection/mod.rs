//! Connection management: one serialized writer, pooled readers.

pub mod pool;
pub mod pragmas;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use specdrift_core::errors::StorageError;

use self::pool::ReadPool;
use self::pragmas::apply_pragmas;
use crate::migrations;

/// The trend store database. All writes go through the single writer
/// connection; reads use the round-robin pool.
pub struct Database {
    writer: Mutex<Connection>,
    readers: ReadPool,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed), apply pragmas, run migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Sqlite {
                    message: format!("create {}: {e}", parent.display()),
                })?;
            }
        }
        let writer = Connection::open(path).map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open(path, ReadPool::default_size())?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory database for tests. Readers cannot see the writer's
    /// data, so tests read through `with_writer`.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let writer = Connection::open_in_memory().map_err(|e| StorageError::Sqlite {
            message: e.to_string(),
        })?;
        apply_pragmas(&writer)?;
        migrations::run_migrations(&writer)?;

        let readers = ReadPool::open_in_memory(1)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            path: None,
        })
    }

    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.writer.lock().map_err(|_| StorageError::Sqlite {
            message: "write lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.readers.with_conn(f)
    }

    /// Read through the pool, or through the writer for in-memory
    /// databases (whose pooled readers see a separate database).
    pub fn read<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        if self.path.is_some() {
            self.readers.with_conn(f)
        } else {
            self.with_writer(f)
        }
    }

    /// WAL checkpoint after a recording burst.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(|e| StorageError::Sqlite {
                    message: e.to_string(),
                })
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
