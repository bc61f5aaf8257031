//! Embedded relational store driver.

use super::types::{validate_id, ResultStore, StoreError, StoredArtifact};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Single-file relational driver backed by an embedded SQLite database.
///
/// The connection is serialized behind a mutex; artifact payloads are
/// small enough that contention here is not on the hot path.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS artifacts (
                 id         TEXT PRIMARY KEY,
                 payload    BLOB NOT NULL,
                 mime_type  TEXT NOT NULL,
                 created_ms INTEGER NOT NULL
             );",
        )
        .map_err(db_err)?;

        info!(path = %path.display(), "SQLite store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, used by tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS artifacts (
                 id         TEXT PRIMARY KEY,
                 payload    BLOB NOT NULL,
                 mime_type  TEXT NOT NULL,
                 created_ms INTEGER NOT NULL
             );",
        )
        .map_err(db_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl ResultStore for SqliteStore {
    fn store(&self, id: &str, bytes: &[u8], mime_type: &str) -> Result<(), StoreError> {
        validate_id(id)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO artifacts (id, payload, mime_type, created_ms)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 payload = excluded.payload,
                 mime_type = excluded.mime_type,
                 created_ms = excluded.created_ms",
            params![id, bytes, mime_type, Utc::now().timestamp_millis()],
        )
        .map_err(db_err)?;

        debug!(id = id, bytes = bytes.len(), "Artifact stored");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<StoredArtifact, StoreError> {
        validate_id(id)?;

        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT payload, mime_type, created_ms FROM artifacts WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?;

        match row {
            Some((bytes, mime_type, created_ms)) => Ok(StoredArtifact {
                id: id.to_string(),
                bytes,
                mime_type,
                created_at: millis_to_datetime(created_ms),
            }),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;

        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM artifacts WHERE id = ?1", params![id])
            .map_err(db_err)?;
        Ok(())
    }

    fn sweep(&self, max_age: Duration) -> Result<usize, StoreError> {
        let cutoff_ms = Utc::now().timestamp_millis() - max_age.as_millis() as i64;

        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute(
                "DELETE FROM artifacts WHERE created_ms < ?1",
                params![cutoff_ms],
            )
            .map_err(db_err)?;

        if removed > 0 {
            info!(removed = removed, "Database sweep removed expired artifacts");
        }
        Ok(removed)
    }

    fn artifact_count(&self) -> usize {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM artifacts", [], |row| {
            row.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}
