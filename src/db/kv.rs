//! Key-value slots: the durable local store and the session-scoped marker store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;

/// A string key-value slot with single-key overwrite semantics.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn clear(&self) -> Result<(), AppError>;
}

/// Durable key-value store backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Process-lifetime key-value store, used for the session marker.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.items
            .lock()
            .map_err(|_| AppError::Internal("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.lock()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sqlite_store_overwrites_single_key() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("local.sqlite"))
            .await
            .unwrap();
        let store = SqliteStore::new(pool);

        assert_eq!(store.get_item("k").await.unwrap(), None);

        store.set_item("k", "one").await.unwrap();
        store.set_item("k", "two").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("two"));

        store.clear().await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("local.sqlite");

        {
            let store = SqliteStore::new(init_database(&path).await.unwrap());
            store.set_item("k", "kept").await.unwrap();
        }

        let store = SqliteStore::new(init_database(&path).await.unwrap());
        assert_eq!(store.get_item("k").await.unwrap().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryStore::new();
        store.set_item("a", "1").await.unwrap();
        store.set_item("b", "2").await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.get_item("a").await.unwrap(), None);
        assert_eq!(store.get_item("b").await.unwrap(), None);
    }
}
