//! Store abstraction over named request/response mappings.

use super::entry::{CacheMatch, RequestKey, StoredResponse};
use crate::Error;

/// Named key/value stores of request/response pairs.
///
/// Mirrors the platform cache API: stores are created on first write,
/// entries enumerate in insertion order, and a lookup across all stores
/// consults them in creation order.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist.
    async fn open_store(&self, name: &str) -> Result<(), Error>;

    /// Get a response from one store.
    async fn get(&self, store: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Get a response from the first store holding `key`.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CacheMatch>, Error>;

    /// Insert or overwrite one entry, creating the store if needed.
    async fn put(&self, store: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error>;

    /// Write a batch atomically: either every entry lands or none does.
    async fn put_all(&self, store: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error>;

    /// Delete one entry. Returns whether it existed.
    async fn delete(&self, store: &str, key: &RequestKey) -> Result<bool, Error>;

    /// Keys of one store in enumeration order. Empty for a missing store.
    async fn keys(&self, store: &str) -> Result<Vec<RequestKey>, Error>;

    /// Delete a store and all its entries. Returns whether it existed.
    async fn delete_store(&self, name: &str) -> Result<bool, Error>;

    /// Names of all stores in creation order.
    async fn list_store_names(&self) -> Result<Vec<String>, Error>;
}
