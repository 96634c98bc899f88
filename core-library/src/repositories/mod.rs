//! # Repository Pattern Implementation
//!
//! The catalog is persisted as one JSON array under a single key of a
//! platform [`KeyValueStore`](bridge_traits::storage::KeyValueStore).
//!
//! ## Architecture
//!
//! - [`CatalogRepository`] defines the interface
//! - [`KeyValueCatalogRepository`] implements it over any key-value bridge
//! - All operations return `Result<T>`; "not found" is `Ok(None)` or `Ok(false)`

pub mod catalog;

pub use catalog::{CatalogRepository, KeyValueCatalogRepository};
