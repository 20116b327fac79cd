use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use super::connection::ensure_schema;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to open storage: {0:#}")]
    Open(anyhow::Error),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

/// Flat string key-value storage. Keys are item names, values are serialized
/// captures, but the store itself knows nothing about either.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Insert or overwrite.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Every key currently present, in ascending order.
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// SQLite-backed store using the `captures` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = ensure_schema(path).map_err(StoreError::Open)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM captures WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO captures (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key FROM captures ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// Process-local store for tests and `--ephemeral` sessions.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites_and_lists_sorted() {
        let store = MemoryStore::new();
        store.set("pikachu", "a").unwrap();
        store.set("bulbasaur", "b").unwrap();
        store.set("pikachu", "c").unwrap();

        assert_eq!(store.get("pikachu").unwrap().as_deref(), Some("c"));
        assert_eq!(store.get("mew").unwrap(), None);
        assert_eq!(store.list_keys().unwrap(), vec!["bulbasaur", "pikachu"]);
    }
}
