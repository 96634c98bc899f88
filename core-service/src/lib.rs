//! Core service façade and bootstrap helpers.
//!
//! This crate wires a [`CatalogConfig`] into the catalog store and exposes
//! the operations a presentation layer calls. Desktop apps typically enable
//! the `desktop-shims` feature (SQLite key-value store created from a
//! database path), whereas WebAssembly builds enable the `wasm` feature and
//! rely on the `localStorage` adapter from `bridge-wasm`.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use core_library::models::{CatalogEntry, EntryInput};
use core_library::query::CatalogStats;
use core_library::repositories::{CatalogRepository, KeyValueCatalogRepository};
use core_runtime::config::CatalogConfig;
use core_runtime::logging::truncate_for_log;
use tracing::debug;

// Titles and queries are user text; keep log lines bounded.
const LOGGED_TEXT_CHARS: usize = 48;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::build_wasm_bridges;

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the same repository and therefore the same
/// mutation lock.
#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    /// Create a service backed by the store, key and clock in `config`.
    pub fn new(config: &CatalogConfig) -> Self {
        debug!(
            storage_key = %config.storage_key,
            strict_decoding = config.strict_decoding,
            "Creating catalog service"
        );
        let repository = KeyValueCatalogRepository::new(
            Arc::clone(&config.key_value_store),
            config.storage_key.clone(),
        )
        .with_clock(Arc::clone(&config.clock))
        .with_strict_decoding(config.strict_decoding);

        Self::with_repository(Arc::new(repository))
    }

    /// Create a service over an existing repository.
    pub fn with_repository(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    /// Access the repository used by the service.
    pub fn repository(&self) -> Arc<dyn CatalogRepository> {
        Arc::clone(&self.repository)
    }

    pub async fn load_all(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.repository.load_all().await?)
    }

    pub async fn save_all(&self, entries: &[CatalogEntry]) -> Result<()> {
        Ok(self.repository.save_all(entries).await?)
    }

    /// Store a new entry as given. See [`create_validated`](Self::create_validated)
    /// for the checked variant.
    pub async fn create(&self, data: EntryInput) -> Result<CatalogEntry> {
        let entry = self.repository.create(data).await?;
        debug!(
            entry_id = %entry.id,
            title = %truncate_for_log(&entry.title, LOGGED_TEXT_CHARS),
            "Catalog entry stored"
        );
        Ok(entry)
    }

    /// Validate `data` like the entry form does, then store it.
    pub async fn create_validated(&self, data: EntryInput) -> Result<CatalogEntry> {
        data.validate()?;
        self.create(data).await
    }

    /// Returns `Ok(None)` when no entry has this id.
    pub async fn update(&self, id: &str, data: EntryInput) -> Result<Option<CatalogEntry>> {
        Ok(self.repository.update(id, data).await?)
    }

    /// Validate `data`, then update. Invalid input is rejected even when the
    /// id does not exist.
    pub async fn update_validated(
        &self,
        id: &str,
        data: EntryInput,
    ) -> Result<Option<CatalogEntry>> {
        data.validate()?;
        self.update(id, data).await
    }

    /// Returns `Ok(false)` when no entry has this id.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.repository.delete(id).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.repository.get_by_id(id).await?)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>> {
        let hits = self.repository.search(query).await?;
        debug!(
            query = %truncate_for_log(query, LOGGED_TEXT_CHARS),
            hits = hits.len(),
            "Catalog searched"
        );
        Ok(hits)
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        Ok(self.repository.stats().await?)
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Opens (or creates) the SQLite key-value database at `database_path` and
/// uses the default storage key.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(database_path: impl Into<std::path::PathBuf>) -> Result<CatalogService> {
    let config = CatalogConfig::builder()
        .database_path(database_path)
        .build()?;
    Ok(CatalogService::new(&config))
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```
/// # #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
/// # async fn example() -> core_service::Result<()> {
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// // Empty namespace: read the catalog the web app already stored.
/// let catalog = bootstrap_wasm(WasmBridgeConfig::new("")).await?;
/// let entries = catalog.load_all().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(config: WasmBridgeConfig) -> Result<CatalogService> {
    let bridges = build_wasm_bridges(config)
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let config = CatalogConfig::builder()
        .key_value_store(bridges.key_value_store)
        .clock(bridges.clock)
        .build()?;
    Ok(CatalogService::new(&config))
}
