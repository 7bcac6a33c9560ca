//! Document digests.

use sha2::{Digest, Sha256};

/// Number of hex characters kept by [`short_digest`].
pub const SHORT_DIGEST_LEN: usize = 12;

/// Compute SHA256 hash of bytes.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute SHA256 hash of a string.
pub fn sha256_str(s: &str) -> String {
    sha256_bytes(s.as_bytes())
}

/// Abbreviated digest for display next to a document.
pub fn short_digest(s: &str) -> String {
    let mut hash = sha256_str(s);
    hash.truncate(SHORT_DIGEST_LEN);
    hash
}
