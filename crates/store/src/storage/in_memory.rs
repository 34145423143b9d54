use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::KeyValueStorage;
use crate::error::StorageError;

/// In-memory storage for tests/dev.
///
/// Writes can be switched to fail, to exercise the store's degraded paths.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    inner: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, bypassing failure switches and write counting.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.into(), value.into());
        }
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Synchronous peek for assertions.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.inner.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::backend("simulated read failure"));
        }
        let map = self
            .inner
            .read()
            .map_err(|_| StorageError::backend("lock poisoned"))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::backend("simulated write failure"));
        }
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageError::backend("lock poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageError::backend("lock poisoned"))?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v1").await.unwrap();
        storage.set("k", "v2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.write_count(), 2);

        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert_eq!(storage.snapshot("k"), None);
    }

    #[tokio::test]
    async fn failure_switches() {
        let storage = InMemoryStorage::new().with_entry("k", "seed");

        storage.set_fail_writes(true);
        assert!(storage.set("k", "new").await.is_err());
        assert_eq!(storage.snapshot("k").as_deref(), Some("seed"));

        storage.set_fail_reads(true);
        assert!(storage.get("k").await.is_err());
    }
}
