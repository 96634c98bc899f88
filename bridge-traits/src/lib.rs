//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the catalog core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per platform.
//!
//! ## Traits
//!
//! - [`KeyValueStore`](storage::KeyValueStore) - Durable key-value slot holding the catalog blob
//! - [`Clock`](time::Clock) - Time source for deterministic record timestamps
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Implementations
//!
//! | Platform | Implementation Crate | Store |
//! |----------|---------------------|-------|
//! | Desktop  | `bridge-desktop`    | `SqliteKeyValueStore` |
//! | Web      | `bridge-wasm`       | `LocalStorageKeyValueStore` |
//! | Tests    | this crate          | `InMemoryKeyValueStore` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Platform implementations convert their native failures into it and include
//! the failing key or path in the message.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets (see
//! [`PlatformSendSync`](platform::PlatformSendSync)); on `wasm32` the bound is
//! dropped because browser handles are single-threaded.

pub mod error;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use storage::{InMemoryKeyValueStore, KeyValueStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
