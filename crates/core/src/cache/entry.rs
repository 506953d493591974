//! Request keys and captured responses.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::hash::compute_request_hash;

/// Normalized request identity: method plus canonical URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Key for a GET request, the only method the worker stores.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: "GET".into(), url: url.into() }
    }

    /// Storage hash of this key.
    pub fn hash(&self) -> String {
        compute_request_hash(&self.method, &self.url)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response snapshot held in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StoredResponse {
    /// Final URL the response was served from.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// Header name/value pairs in received order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// RFC 3339 time the response was captured.
    pub stored_at: String,
}

/// A lookup hit across stores, with the store that answered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMatch {
    pub store_name: String,
    pub response: StoredResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_key_display() {
        let key = RequestKey::get("https://moonlight.test/menu2.html");
        assert_eq!(key.to_string(), "GET https://moonlight.test/menu2.html");
    }

    #[test]
    fn test_request_key_hash_matches_helper() {
        let key = RequestKey::get("https://moonlight.test/");
        assert_eq!(key.hash(), compute_request_hash("GET", "https://moonlight.test/"));
    }
}
