use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cached entry for {0}")]
    Miss(String),

    #[error("Cache lock poisoned")]
    Poisoned,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Key-value snapshot store on SQLite
///
/// Each key holds one JSON blob. Writes replace the whole blob; there is
/// no merging and no expiry.
pub struct CacheManager {
    conn: Mutex<Connection>,
}

impl CacheManager {
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Throwaway store, mostly for tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let data = serde_json::to_string(value)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, data, cached_at) VALUES (?1, ?2, ?3)",
            params![key, data, Utc::now().timestamp()],
        )?;
        debug!("Stored snapshot {} ({} bytes)", key, data.len());
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let conn = self.lock()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM snapshots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(CacheError::Miss(key.to_string())),
        }
    }

    /// When the snapshot under `key` was last written
    pub fn cached_at(&self, key: &str) -> Result<DateTime<Utc>> {
        let conn = self.lock()?;
        let secs: Option<i64> = conn
            .query_row(
                "SELECT cached_at FROM snapshots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        secs.and_then(|s| DateTime::from_timestamp(s, 0))
            .ok_or_else(|| CacheError::Miss(key.to_string()))
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM snapshots WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let cache = CacheManager::in_memory().unwrap();
        cache.set("numbers", &vec![1, 2, 3]).unwrap();

        let numbers: Vec<i32> = cache.get("numbers").unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(cache.cached_at("numbers").is_ok());
    }

    #[test]
    fn test_set_overwrites_whole_snapshot() {
        let cache = CacheManager::in_memory().unwrap();
        cache.set("names", &vec!["a", "b", "c"]).unwrap();
        cache.set("names", &vec!["d"]).unwrap();

        let names: Vec<String> = cache.get("names").unwrap();
        assert_eq!(names, vec!["d".to_string()]);
    }

    #[test]
    fn test_missing_key_is_a_miss() {
        let cache = CacheManager::in_memory().unwrap();
        let result = cache.get::<Vec<i32>>("nothing");
        assert!(matches!(result, Err(CacheError::Miss(ref k)) if k == "nothing"));
    }

    #[test]
    fn test_delete_removes_entry() {
        let cache = CacheManager::in_memory().unwrap();
        cache.set("gone", &"soon").unwrap();
        cache.delete("gone").unwrap();

        assert!(matches!(cache.get::<String>("gone"), Err(CacheError::Miss(_))));
        assert!(matches!(cache.cached_at("gone"), Err(CacheError::Miss(_))));
    }

    #[test]
    fn test_wrong_shape_is_serialization_error() {
        let cache = CacheManager::in_memory().unwrap();
        cache.set("text", &"not a list").unwrap();

        let result = cache.get::<Vec<i32>>("text");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }
}
