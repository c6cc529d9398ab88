use crate::kv::error::KvResult;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;

/// Large-value store behind the primary store's sentinel.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> KvResult<()>;

    async fn remove(&self, key: &str) -> KvResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// Blob store backed by the `kv_blobs` table.
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => Some(row.try_get("value")?),
            None => None,
        })
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let updated_at = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
                INSERT INTO kv_blobs (key, value, updated_at) VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> KvResult<()> {
        sqlx::query("DELETE FROM kv_blobs WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
