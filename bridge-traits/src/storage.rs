//! Key-Value Storage Abstractions
//!
//! The catalog persists its whole collection as one serialized blob under a
//! single key, so the only storage capability a host has to provide is a
//! durable string-to-string map with last-write-wins semantics.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;

/// Durable key-value storage trait
///
/// Abstracts platform-specific persistent slots:
/// - Web: `localStorage`
/// - Desktop: SQLite-backed table
/// - Tests: [`InMemoryKeyValueStore`]
///
/// Values are opaque strings. Implementations give no transactional guarantee
/// beyond a single `set` replacing the previous value as a whole.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember_theme(store: &dyn KeyValueStore) -> Result<()> {
///     store.set("theme", "dark").await?;
///     assert_eq!(store.get("theme").await?.as_deref(), Some("dark"));
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait KeyValueStore: PlatformSendSync {
    /// Retrieve the value stored under `key`
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Platform failures (quota exceeded, disk errors) are reported and never
    /// retried.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    async fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// HashMap-backed key-value store.
///
/// Used by tests and by hosts that do not need persistence across sessions.
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a single value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> BridgeError {
    BridgeError::OperationFailed("in-memory store lock poisoned".to_string())
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.is_empty());

        store.set("book-catalog", "[]").await.unwrap();
        assert_eq!(
            store.get("book-catalog").await.unwrap(),
            Some("[]".to_string())
        );
        assert!(store.contains_key("book-catalog").await.unwrap());

        store.set("book-catalog", "[1]").await.unwrap();
        assert_eq!(
            store.get("book-catalog").await.unwrap(),
            Some("[1]".to_string())
        );
        assert_eq!(store.len(), 1);

        store.remove("book-catalog").await.unwrap();
        assert_eq!(store.get("book-catalog").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_noop() {
        let store = InMemoryKeyValueStore::new();
        store.remove("missing").await.unwrap();
        assert!(!store.contains_key("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryKeyValueStore::with_value("a", "1");
        let other = store.clone();
        other.set("b", "2").await.unwrap();

        assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.len(), 2);
    }
}
