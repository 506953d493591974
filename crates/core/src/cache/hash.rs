//! Request key hashing.

use sha2::{Digest, Sha256};

/// Compute the storage hash of a normalized request key.
pub fn compute_request_hash(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
