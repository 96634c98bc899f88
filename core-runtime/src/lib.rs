//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the media catalog core:
//! - Logging and tracing setup
//! - Configuration management with fail-fast capability checks
//!
//! Other crates in the workspace depend on this one for their logging
//! conventions and for the [`config::CatalogConfig`] they are built from.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
