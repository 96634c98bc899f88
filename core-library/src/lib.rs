//! # Catalog Library Module
//!
//! Owns the personal media catalog: the entry model, the persisted
//! collection and the query helpers the UI uses to narrow it.
//!
//! ## Overview
//!
//! - [`models`]: `CatalogEntry`, `EntryInput`, ids, genre suggestions
//! - [`repositories`]: `CatalogRepository` over a platform key-value store
//! - [`query`]: substring search and catalog statistics
//!
//! The whole collection lives in one JSON array under a single storage key.
//! There is no index or cache; every operation re-reads the collection.

pub mod error;
pub mod models;
pub mod query;
pub mod repositories;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use error::{LibraryError, Result};
pub use models::{CatalogEntry, EntryId, EntryInput, EntryKind};
pub use query::CatalogStats;
pub use repositories::{CatalogRepository, KeyValueCatalogRepository};
