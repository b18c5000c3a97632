//! SQLite-backed key-value storage.
//!
//! # Invariants
//! - Connections handed to this type must already be migrated.
//! - One row per key; writes are upserts.

use super::{KeyValueStorage, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value storage over the `kv_store` table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) a storage file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a throwaway in-memory storage.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::storage::KeyValueStorage;

    #[test]
    fn upsert_replaces_existing_value() {
        let storage = SqliteStorage::open_in_memory().expect("storage should open");
        storage.set_item("lastRoute", "/dashboard").expect("first write");
        storage.set_item("lastRoute", "/requests").expect("second write");
        assert_eq!(
            storage.get_item("lastRoute").expect("read").as_deref(),
            Some("/requests")
        );
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("portal.sqlite3");
        {
            let storage = SqliteStorage::open(&path).expect("storage should open");
            storage.set_item("lastRoute", "/people/directory").expect("write");
        }
        let reopened = SqliteStorage::open(&path).expect("storage should reopen");
        assert_eq!(
            reopened.get_item("lastRoute").expect("read").as_deref(),
            Some("/people/directory")
        );
        reopened.remove_item("lastRoute").expect("remove");
        assert_eq!(reopened.get_item("lastRoute").expect("read"), None);
    }
}
