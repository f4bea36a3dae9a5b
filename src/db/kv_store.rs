//! String-keyed persistent storage, the server-side stand-in for the page's
//! local storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;

use crate::errors::AppError;

/// Key holding the serialized class collection.
pub const CLASSES_KEY: &str = "classes";
/// Key holding the signed-in user's e-mail address.
pub const USER_EMAIL_KEY: &str = "userEmail";
/// Key holding the signed-in user's display name.
pub const USERNAME_KEY: &str = "username";

/// Persistent string key-value storage.
///
/// Every successful write bumps a monotonically increasing revision so
/// clients can tell when their projections are stale.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove_item(&self, key: &str) -> Result<(), AppError>;

    async fn revision(&self) -> Result<i64, AppError>;
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() > 0 {
            sqlx::query(
                "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1",
            )
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn revision(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }
}

/// Process-local store, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKvStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    items: HashMap<String, String>,
    revision: i64,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.inner.read().await.items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.items.insert(key.to_string(), value.to_string());
        inner.revision += 1;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.items.remove(key).is_some() {
            inner.revision += 1;
        }
        Ok(())
    }

    async fn revision(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.revision)
    }
}
