use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use directories::BaseDirs;
use rusqlite::{Connection, Error as SqlError, ErrorCode};
use thiserror::Error;
use tracing::debug;

/// Folder name used beneath the user's home directory for application data:
/// the database, the settings file, and the log file all live here.
const DATA_DIR_NAME: &str = ".skill-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "skills.sqlite";

/// Hard failure classes of the storage engine. Row-level misses (update or
/// delete on an id nobody has) are not errors; they surface as zero rows
/// affected.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The engine cannot be reached at all: unopenable file, poisoned lock.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// A SQLite constraint rejected the statement.
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// A row or statement the engine could not make sense of.
    #[error("malformed row or statement: {0}")]
    Malformed(String),
}

impl From<SqlError> for StoreError {
    fn from(err: SqlError) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Constraint(err.to_string()),
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Malformed(err.to_string()),
        }
    }
}

/// Handle to the embedded SQLite database. Constructed once at startup and
/// passed by `Arc` into the repository and the provider shim; there is no
/// process-wide singleton to reach for.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path`, creating parent directories
    /// and running lazy schema creation.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        }
        let conn = Connection::open(path)?;
        ensure_schema(&conn)?;
        debug!(path = %path.display(), "opened skill database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway in-memory database with the full schema. Used by
    /// tests and handy for scratch runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a closure against the live connection. All row operations funnel
    /// through here so locking stays in one place.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
        f(&mut conn)
    }
}

/// Create the two tables when they do not exist yet. There is no foreign-key
/// constraint between them and no index beyond the primary keys; the
/// application layer keeps the skill/progress link consistent.
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS skill (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            description TEXT,
            lastEditDate TEXT
        );

        CREATE TABLE IF NOT EXISTS progress (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            skillId INTEGER,
            status TEXT,
            tracker INTEGER,
            personalNotes TEXT
        );",
    )?;
    Ok(())
}

/// Resolve the application data directory inside the user's home, creating it
/// when absent.
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    let dir = base_dirs.home_dir().join(DATA_DIR_NAME);
    fs::create_dir_all(&dir).context("failed to create data directory")?;
    Ok(dir)
}

/// Default location of the SQLite database beneath the data directory.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
    }

    #[test]
    fn open_at_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skills.sqlite");
        let store = Store::open_at(&path).unwrap();
        store.with_conn(|_| Ok(())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn with_conn_passes_results_through() {
        let store = Store::open_in_memory().unwrap();
        let count: i64 = store
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM skill", [], |row| row.get(0))
                    .map_err(StoreError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }
}
