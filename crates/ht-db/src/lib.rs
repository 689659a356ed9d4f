//! Storage layer for the time tracker.
//!
//! Provides a small key-value string store on top of `rusqlite`. The entry
//! store persists its whole forest as one JSON blob under a fixed key, so
//! this layer never needs to understand entries.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ```sql
//! kv (key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```
//!
//! `updated_at` is stored as ISO 8601 text with millisecond precision
//! (e.g. `2026-01-15T10:30:00.000Z`).

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Reads the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        self.set_all(&[(key, value)])
    }

    /// Stores several values in one transaction, so readers see all or none.
    pub fn set_all(&self, pairs: &[(&str, &str)]) -> Result<(), DbError> {
        let now = format_timestamp(Utc::now());
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "
                INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
            )?;
            for (key, value) in pairs {
                stmt.execute(params![key, value, now])?;
                tracing::trace!(key, bytes = value.len(), "value stored");
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("timeEntries").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let db = Database::open_in_memory().unwrap();
        db.set("timeEntries", "[]").unwrap();
        db.set("timeEntries", r#"[{"id":1}]"#).unwrap();

        assert_eq!(db.get("timeEntries").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
    }

    #[test]
    fn set_all_writes_every_pair() {
        let db = Database::open_in_memory().unwrap();
        db.set("b", "old").unwrap();
        db.set_all(&[("a", "1"), ("b", "2")]).unwrap();

        assert_eq!(db.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(db.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn updated_at_uses_millisecond_iso() {
        let db = Database::open_in_memory().unwrap();
        db.set("k", "v").unwrap();
        let updated_at: String = db
            .conn
            .query_row("SELECT updated_at FROM kv WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert!(DateTime::parse_from_rfc3339(&updated_at).is_ok());
        assert_eq!(updated_at.len(), "2026-01-15T10:30:00.000Z".len());
    }

    #[test]
    fn values_persist_across_connections() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("ht.db");

        Database::open(&path).unwrap().set("k", "v").unwrap();
        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn forest_blob_round_trips_through_storage() {
        let db = Database::open_in_memory().unwrap();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let mut store = ht_core::EntryStore::new();
        let parent = store.create(None, "Write spec", t0).unwrap();
        store.create(Some(parent.id), "Draft outline", t0).unwrap();

        db.set(ht_core::STORAGE_KEY, &store.forest().serialize().unwrap())
            .unwrap();
        let blob = db.get(ht_core::STORAGE_KEY).unwrap();
        let restored = ht_core::EntryStore::init(blob.as_deref()).unwrap();

        assert_eq!(restored.forest(), store.forest());
    }
}
