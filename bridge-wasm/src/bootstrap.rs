//! Convenience helpers for wiring the wasm bridge implementations together.
//!
//! Host shells use [`build_wasm_bridges`] to construct initialized adapters
//! without writing glue code. The result mirrors the role `bridge-desktop`
//! plays for native targets.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    storage::KeyValueStore,
    time::{Clock, SystemClock},
};

use crate::storage::LocalStorageKeyValueStore;

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone, Default)]
pub struct WasmBridgeConfig {
    /// Prefix for `localStorage` keys. Empty means raw keys.
    pub namespace: String,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

/// Constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// Key-value store layered on `localStorage`.
    pub key_value_store: Arc<dyn KeyValueStore>,
    /// Browser clock (`Date.now()` through chrono's `wasmbind`).
    pub clock: Arc<dyn Clock>,
}

/// Build the default wasm bridge stack.
///
/// Fails with `BridgeError::NotAvailable` when there is no `window` (e.g. in a
/// worker) or the browser disabled `localStorage`.
pub async fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let key_value_store: Arc<dyn KeyValueStore> =
        Arc::new(LocalStorageKeyValueStore::new(config.namespace)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    Ok(WasmBridgeSet {
        key_value_store,
        clock,
    })
}
