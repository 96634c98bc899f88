//! WebAssembly bindings for core-library
//!
//! Exposes the catalog store to JavaScript as `JsCatalog`. Entries cross the
//! boundary as plain objects in the persisted JSON shape; "not found" is
//! `null` (or `false` for `delete`). Every store call returns a `Promise`.

use crate::error::LibraryError;
use crate::models::{CatalogEntry, EntryInput, GENRE_SUGGESTIONS};
use crate::repositories::{CatalogRepository, KeyValueCatalogRepository};
use bridge_wasm::LocalStorageKeyValueStore;
use js_sys::Promise;
use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

const DEFAULT_STORAGE_KEY: &str = "book-catalog";

// Set up panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_error(err: LibraryError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// Maps serialize as plain objects and `None` as `null`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// JavaScript-accessible catalog store backed by `localStorage`
#[wasm_bindgen]
pub struct JsCatalog {
    repository: Rc<KeyValueCatalogRepository>,
}

#[wasm_bindgen]
impl JsCatalog {
    /// Open the catalog stored under `storageKey` (default `book-catalog`).
    ///
    /// Keys are used verbatim, so data written by earlier web releases is
    /// picked up as-is.
    #[wasm_bindgen(constructor)]
    pub fn new(storage_key: Option<String>) -> Result<JsCatalog, JsValue> {
        let store =
            LocalStorageKeyValueStore::new("").map_err(|e| JsValue::from_str(&e.to_string()))?;
        let key = storage_key.unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Ok(Self {
            repository: Rc::new(KeyValueCatalogRepository::new(Arc::new(store), key)),
        })
    }

    #[wasm_bindgen(js_name = loadAll)]
    pub fn load_all(&self) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let entries = repository.load_all().await.map_err(to_js_error)?;
            to_js(&entries)
        })
    }

    #[wasm_bindgen(js_name = saveAll)]
    pub fn save_all(&self, entries: JsValue) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let entries: Vec<CatalogEntry> = from_js(entries)?;
            repository.save_all(&entries).await.map_err(to_js_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn create(&self, data: JsValue) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let input: EntryInput = from_js(data)?;
            let entry = repository.create(input).await.map_err(to_js_error)?;
            to_js(&entry)
        })
    }

    /// Resolves to the updated entry or `null`.
    pub fn update(&self, id: String, data: JsValue) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let input: EntryInput = from_js(data)?;
            let updated = repository.update(&id, input).await.map_err(to_js_error)?;
            to_js(&updated)
        })
    }

    pub fn delete(&self, id: String) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let deleted = repository.delete(&id).await.map_err(to_js_error)?;
            Ok(JsValue::from_bool(deleted))
        })
    }

    /// Resolves to the entry or `null`.
    #[wasm_bindgen(js_name = getById)]
    pub fn get_by_id(&self, id: String) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let entry = repository.get_by_id(&id).await.map_err(to_js_error)?;
            to_js(&entry)
        })
    }

    pub fn search(&self, query: String) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let entries = repository.search(&query).await.map_err(to_js_error)?;
            to_js(&entries)
        })
    }

    pub fn stats(&self) -> Promise {
        let repository = self.repository.clone();
        future_to_promise(async move {
            let stats = repository.stats().await.map_err(to_js_error)?;
            to_js(&stats)
        })
    }

    /// Check an input object without storing it; throws on the first problem.
    pub fn validate(data: JsValue) -> Result<(), JsValue> {
        let input: EntryInput = from_js(data)?;
        input.validate().map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = genreSuggestions)]
    pub fn genre_suggestions() -> Result<JsValue, JsValue> {
        to_js(&GENRE_SUGGESTIONS)
    }
}
