//! Durable client-side key/value storage.
//!
//! Values are opaque strings, mirroring browser local storage. The web layer
//! uses the per-browser [`tower_sessions::Session`]; tests and tools use
//! [`MemoryStorage`].

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tower_sessions::Session;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ClientStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same underlying map, so a clone
/// outlives the store that wrote to it the way browser storage outlives a page.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ClientStorage for Session {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .get_value(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        // Records are written as JSON strings; anything else is handed back in
        // its JSON text form so the caller's parser decides whether it is usable.
        Ok(value.map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.insert(key, value)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove_value(key)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "v".to_string()).await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), Some("v".to_string()));

        storage.remove_item("k").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        // Removing again is fine
        storage.remove_item("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("k", "v".to_string()).await.unwrap();
        assert_eq!(other.get_item("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_session_storage_roundtrip() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        session.set_item("k", "{\"a\":1}".to_string()).await.unwrap();
        assert_eq!(
            session.get_item("k").await.unwrap(),
            Some("{\"a\":1}".to_string())
        );

        session.remove_item("k").await.unwrap();
        assert_eq!(session.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_storage_non_string_value() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session.insert("k", 42).await.unwrap();

        assert_eq!(session.get_item("k").await.unwrap(), Some("42".to_string()));
    }
}
