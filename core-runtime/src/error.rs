//! Errors raised while configuring the catalog runtime.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing or malformed.
    #[error("Invalid catalog configuration: {0}")]
    Config(String),

    /// No platform adapter was supplied for a required capability.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// The default key-value database could not be opened.
    #[error("Cannot open catalog database at {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },

    /// A global tracing subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    LoggingInstalled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
