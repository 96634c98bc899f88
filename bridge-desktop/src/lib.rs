//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `KeyValueStore` using a SQLite-backed key-value table (`sqlx`)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::SqliteKeyValueStore;
//! use bridge_traits::KeyValueStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SqliteKeyValueStore::new("catalog.db".into()).await.unwrap();
//!     store.set("book-catalog", "[]").await.unwrap();
//! }
//! ```

mod key_value;

pub use key_value::SqliteKeyValueStore;
