//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the bridge traits defined
//! in `bridge-traits`, using `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate on native targets.
//!
//! # Implementations
//!
//! - `LocalStorageKeyValueStore`: `window.localStorage`-backed key-value store
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::LocalStorageKeyValueStore;
//! use bridge_traits::storage::KeyValueStore;
//!
//! #[wasm_bindgen_test]
//! async fn test_catalog_slot() {
//!     let store = LocalStorageKeyValueStore::new("").unwrap();
//!     store.set("book-catalog", "[]").await.unwrap();
//! }
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use storage::LocalStorageKeyValueStore;
