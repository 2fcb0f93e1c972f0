//! String key-value storage with SQLite and in-memory backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use crate::errors::AppError;

/// Key-value storage. Writes overwrite in place; there is no history.
#[derive(Clone)]
pub enum KeyValueStore {
    Sqlite(SqlitePool),
    Memory(MemoryStore),
}

impl KeyValueStore {
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match self {
            KeyValueStore::Sqlite(pool) => {
                let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
                    .bind(key)
                    .fetch_optional(pool)
                    .await?;
                Ok(row.map(|row| row.get::<String, _>("value")))
            }
            KeyValueStore::Memory(store) => Ok(store.get(key).await),
        }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        match self {
            KeyValueStore::Sqlite(pool) => {
                let now = Utc::now().to_rfc3339();
                sqlx::query(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                )
                .bind(key)
                .bind(value)
                .bind(&now)
                .execute(pool)
                .await?;
                Ok(())
            }
            KeyValueStore::Memory(store) => store.set(key, value).await,
        }
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        match self {
            KeyValueStore::Sqlite(pool) => {
                sqlx::query("DELETE FROM kv_store WHERE key = ?")
                    .bind(key)
                    .execute(pool)
                    .await?;
                Ok(())
            }
            KeyValueStore::Memory(store) => {
                store.remove(key).await;
                Ok(())
            }
        }
    }
}

/// Process-local storage with an optional size quota, like a browser's local storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Storage that rejects writes once keys plus values would exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                quota_bytes: Some(quota_bytes),
                ..Default::default()
            }),
        }
    }

    #[cfg(test)]
    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.inner.entries.lock().await;

        if let Some(quota) = self.inner.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(AppError::Storage(format!(
                    "Storage quota of {} bytes exceeded",
                    quota
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) {
        self.inner.entries.lock().await.remove(key);
    }
}
