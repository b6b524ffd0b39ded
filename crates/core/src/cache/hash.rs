//! Cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a fully resolved request URL.
pub fn compute_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"GET\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
