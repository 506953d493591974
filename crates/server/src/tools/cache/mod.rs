//! Store inspection tools.

pub mod keys;

pub use keys::{CacheKeysParams, keys_impl};
