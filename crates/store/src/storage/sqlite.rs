//! SQLite-backed key-value storage.

use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::KeyValueStorage;
use crate::error::StorageError;

/// Durable storage in a single `kv` table.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    /// `SqlitePool` is `Send + Sync` and cheap to clone.
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open (creating if needed) the database file at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        Self::connect_inner(path)
            .await
            .map_err(|err| StorageError::Unavailable(format!("{err:#}")))
    }

    /// Private in-memory database (single connection so every query sees the
    /// same data).
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::in_memory_inner()
            .await
            .map_err(|err| StorageError::Unavailable(format!("{err:#}")))
    }

    async fn in_memory_inner() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory SQLite options")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory SQLite database")?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn connect_inner(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create storage directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("failed to create SQLite pool at {path:?}"))?;

        ensure_schema(&pool).await?;
        tracing::debug!(path = %path.display(), "opened SQLite storage");

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key        TEXT PRIMARY KEY NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create kv table")?;
    Ok(())
}

fn backend(err: anyhow::Error) -> StorageError {
    StorageError::Backend(format!("{err:#}"))
}

#[async_trait]
impl KeyValueStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT value
            FROM kv
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to read key {key:?}"))
        .map_err(backend)?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .context("kv row has no value column")
                    .map_err(backend)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key)
            DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to upsert key {key:?}"))
        .map_err(backend)?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            DELETE FROM kv
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to delete key {key:?}"))
        .map_err(backend)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_value() {
        let storage = SqliteStorage::in_memory().await.unwrap();

        assert_eq!(storage.get("inventoryList").await.unwrap(), None);
        storage.set("inventoryList", "[]").await.unwrap();
        storage.set("inventoryList", "[1]").await.unwrap();
        assert_eq!(storage.get("inventoryList").await.unwrap().as_deref(), Some("[1]"));

        storage.remove("inventoryList").await.unwrap();
        assert_eq!(storage.get("inventoryList").await.unwrap(), None);
    }
}
