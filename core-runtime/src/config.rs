//! # Catalog Configuration Module
//!
//! Provides configuration management for the media catalog core.
//!
//! ## Overview
//!
//! A builder constructs a `CatalogConfig` holding the storage bridge, the time
//! source and the settings the catalog store needs. Validation is fail-fast:
//! a missing capability produces an actionable error at build time instead of
//! a failure on the first read.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - Holds the persisted catalog blob
//!
//! When the `desktop-shims` feature is enabled, a `SqliteKeyValueStore` at
//! `database_path` is injected automatically if no store is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CatalogConfig;
//! use bridge_traits::InMemoryKeyValueStore;
//! use std::sync::Arc;
//!
//! let config = CatalogConfig::builder()
//!     .storage_key("book-catalog")
//!     .key_value_store(Arc::new(InMemoryKeyValueStore::new()))
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CatalogConfig;
//!
//! // Without desktop shims and without a store this fails with CapabilityMissing
//! # #[cfg(not(feature = "desktop-shims"))]
//! let config = CatalogConfig::builder()
//!     .build()
//!     .expect("Should fail - missing key-value store");
//! # #[cfg(feature = "desktop-shims")]
//! # panic!("desktop shims require a database path");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, KeyValueStore, SystemClock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key used by every release of the catalog so far.
pub const DEFAULT_STORAGE_KEY: &str = "book-catalog";

/// Configuration for the media catalog core.
///
/// Use [`CatalogConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Key of the single slot holding the serialized catalog
    pub storage_key: String,

    /// Path of the desktop key-value database, when one was configured
    pub database_path: Option<PathBuf>,

    /// Persistent key-value storage (required)
    pub key_value_store: Arc<dyn KeyValueStore>,

    /// Time source for `createdAt`/`updatedAt`
    pub clock: Arc<dyn Clock>,

    /// Report an unreadable blob as an error instead of an empty catalog
    pub strict_decoding: bool,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("storage_key", &self.storage_key)
            .field("database_path", &self.database_path)
            .field("key_value_store", &"KeyValueStore { ... }")
            .field("clock", &"Clock { ... }")
            .field("strict_decoding", &self.strict_decoding)
            .finish()
    }
}

impl CatalogConfig {
    /// Creates a new builder for constructing a `CatalogConfig`.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Storage key is not blank
    /// - Storage key has no leading/trailing whitespace
    /// - Database path, when given, is not empty
    pub fn validate(&self) -> Result<()> {
        validate_settings(&self.storage_key, self.database_path.as_deref())
    }
}

fn validate_settings(storage_key: &str, database_path: Option<&Path>) -> Result<()> {
    if storage_key.trim().is_empty() {
        return Err(Error::Config("Storage key cannot be empty".to_string()));
    }

    if storage_key.trim() != storage_key {
        return Err(Error::Config(format!(
            "Storage key '{}' has surrounding whitespace",
            storage_key
        )));
    }

    if let Some(path) = database_path {
        if path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }
    }

    Ok(())
}

fn key_value_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "KeyValueStore".to_string(),
        message: "KeyValueStore implementation is required to persist the catalog. \
                 Desktop: enable the 'desktop-shims' feature and set .database_path() to use the default SqliteKeyValueStore. \
                 Web: inject bridge_wasm::LocalStorageKeyValueStore. \
                 Tests: inject bridge_traits::InMemoryKeyValueStore."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_key_value_store(
    database_path: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::SqliteKeyValueStore;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let path = database_path
        .map(Path::to_path_buf)
        .ok_or_else(key_value_store_missing_error)?;

    let init_store = |path: PathBuf| -> Result<SqliteKeyValueStore> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create Tokio runtime for default key-value store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqliteKeyValueStore::new(path.clone()))
            .map_err(|e| Error::Storage {
                path,
                message: e.to_string(),
            })
    };

    // A runtime cannot be blocked on from inside another one.
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::Internal(
                    "Worker thread panicked while creating default KeyValueStore".to_string(),
                )
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_key_value_store(
    _database_path: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>> {
    Err(key_value_store_missing_error())
}

/// Builder for constructing [`CatalogConfig`] instances.
#[derive(Default)]
pub struct CatalogConfigBuilder {
    storage_key: Option<String>,
    database_path: Option<PathBuf>,
    key_value_store: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    strict_decoding: bool,
}

impl CatalogConfigBuilder {
    /// Sets the key under which the catalog blob is stored.
    ///
    /// Defaults to [`DEFAULT_STORAGE_KEY`].
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Sets the desktop database path used when no store is injected.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Injects the key-value store.
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Injects the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Report unreadable persisted data as an error instead of treating it
    /// as an empty catalog.
    pub fn strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    /// Builds the final `CatalogConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns an error if:
    /// - No key-value store was injected and no default can be created
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CatalogConfig> {
        let storage_key = self
            .storage_key
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        // Checked before any default store touches the filesystem.
        validate_settings(&storage_key, self.database_path.as_deref())?;

        let key_value_store = match self.key_value_store {
            Some(store) => store,
            None => provide_default_key_value_store(self.database_path.as_deref())?,
        };

        Ok(CatalogConfig {
            storage_key,
            database_path: self.database_path,
            key_value_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            strict_decoding: self.strict_decoding,
        })
    }
}
