//! Durable key-value storage.
//!
//! The store keeps exactly one slot (the serialized inventory list), so the
//! contract is a plain string-to-string map.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryStorage;
pub use sqlite::SqliteStorage;

/// Async string key-value storage.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (insert or replace) the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S> KeyValueStorage for Arc<S>
where
    S: KeyValueStorage + ?Sized,
{
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}
