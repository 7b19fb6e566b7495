//! Content fingerprinting for downloaded images.

use sha2::{Digest, Sha256};

/// Compute the content hash of raw image bytes.
///
/// SHA-256 rendered as lowercase hex. Deterministic, so the same image
/// downloaded twice always collides and is deduplicated by the store.
pub fn compute_content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
