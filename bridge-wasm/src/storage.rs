//! WebAssembly implementation of the key-value storage bridge.
//!
//! Values live in `window.localStorage`. An optional namespace prefixes every
//! key (`{namespace}::{key}`) so several host shells can share an origin;
//! the empty namespace addresses raw keys, which is how catalogs written by
//! earlier releases of the web app are found.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    storage::KeyValueStore,
};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};

fn js_error(context: &str, err: JsValue) -> BridgeError {
    if let Some(dom) = err.dyn_ref::<web_sys::DomException>() {
        if dom.name() == "QuotaExceededError" {
            return BridgeError::QuotaExceeded(format!("localStorage {context}"));
        }
        return BridgeError::OperationFailed(format!(
            "localStorage {context}: {}",
            dom.message()
        ));
    }

    let message = if err.is_string() {
        err.as_string().unwrap_or_default()
    } else if let Some(js_err) = err.dyn_ref::<js_sys::Error>() {
        js_err.message().into()
    } else {
        format!("{err:?}")
    };
    BridgeError::OperationFailed(format!("localStorage {context}: {message}"))
}

fn local_storage() -> BridgeResult<web_sys::Storage> {
    let window = web_sys::window().ok_or_else(|| BridgeError::NotAvailable("window".into()))?;
    window
        .local_storage()
        .map_err(|err| js_error("access", err))?
        .ok_or_else(|| BridgeError::NotAvailable("localStorage".into()))
}

#[derive(Clone)]
/// Browser-backed key-value store.
pub struct LocalStorageKeyValueStore {
    storage: web_sys::Storage,
    namespace: String,
}

impl LocalStorageKeyValueStore {
    /// Construct a store scoped to the provided namespace (may be empty).
    pub fn new(namespace: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            storage: local_storage()?,
            namespace: namespace.into(),
        })
    }

    fn key_for(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}::{}", self.namespace, key)
        }
    }
}

#[async_trait(?Send)]
impl KeyValueStore for LocalStorageKeyValueStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        self.storage
            .get_item(&self.key_for(key))
            .map_err(|err| js_error("get_item", err))
    }

    async fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.storage
            .set_item(&self.key_for(key), value)
            .map_err(|err| js_error("set_item", err))?;
        debug!(key = key, bytes = value.len(), "Stored localStorage value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> BridgeResult<()> {
        self.storage
            .remove_item(&self.key_for(key))
            .map_err(|err| js_error("remove_item", err))
    }
}
