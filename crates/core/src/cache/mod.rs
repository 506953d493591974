//! SQLite-backed response stores.
//!
//! This module provides persistent, named request/response stores using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Stores created on first write and deleted as a unit
//! - Insertion-ordered enumeration of entries
//! - Atomic batch writes for install-time seeding
//! - Automatic schema migrations

pub mod connection;
pub mod entry;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entry::{CacheMatch, RequestKey, StoredResponse};
pub use storage::CacheStorage;
