//! SQLite-backed dedup store.
//!
//! One row per reported session id, so "already notified" survives restarts.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection};

use super::data_dir;
use crate::dedup::DedupStore;
use crate::error::StoreError;

/// Dedup store at `~/.config/slotwatch/slotwatch.db`.
///
/// The connection sits behind a mutex so one store can be shared between
/// poll cycles; SQLite's file lock serializes writers across processes.
pub struct SqliteDedupStore {
    conn: Mutex<Connection>,
}

impl SqliteDedupStore {
    /// Open the default database, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::DataDir(e.to_string()))?;
        Self::open_at(&dir.join("slotwatch.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Recorded ids with the RFC 3339 time they were marked, newest first.
    pub fn list(&self) -> Result<Vec<(String, String)>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, seen_at FROM seen_sessions ORDER BY seen_at DESC, session_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS seen_sessions (
            session_id TEXT PRIMARY KEY,
            seen_at    TEXT NOT NULL
        );",
    )
}

impl DedupStore for SqliteDedupStore {
    fn contains(&self, session_id: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM seen_sessions WHERE session_id = ?1)",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn mark_seen(&self, session_id: &str) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO seen_sessions (session_id, seen_at) VALUES (?1, ?2)",
            params![session_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM seen_sessions", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn()?.execute("DELETE FROM seen_sessions", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_query() {
        let store = SqliteDedupStore::open_memory().unwrap();
        assert!(!store.contains("abc").unwrap());
        store.mark_seen("abc").unwrap();
        assert!(store.contains("abc").unwrap());
        assert!(!store.contains("abd").unwrap());
    }

    #[test]
    fn mark_is_idempotent() {
        let store = SqliteDedupStore::open_memory().unwrap();
        store.mark_seen("abc").unwrap();
        store.mark_seen("abc").unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].0, "abc");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seen.db");
        {
            let store = SqliteDedupStore::open_at(&path).unwrap();
            store.mark_seen("persisted").unwrap();
        }
        let store = SqliteDedupStore::open_at(&path).unwrap();
        assert!(store.contains("persisted").unwrap());
    }

    #[test]
    fn clear_empties_table() {
        let store = SqliteDedupStore::open_memory().unwrap();
        store.mark_seen("a").unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/seen.db");
        assert!(matches!(
            SqliteDedupStore::open_at(&path),
            Err(StoreError::OpenFailed { .. })
        ));
    }
}
