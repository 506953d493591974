//! Core types and shared functionality for the MoonLight offline cache worker.
//!
//! This crate provides:
//! - Named response stores with a SQLite backend
//! - Asset classification and eviction policy
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod policy;

pub use cache::{CacheDb, CacheMatch, CacheStorage, RequestKey, StoredResponse};
pub use config::{ConfigError, NotificationConfig, WorkerConfig};
pub use error::Error;
pub use policy::{AssetClass, ClassifierConfig, EvictionConfig};
