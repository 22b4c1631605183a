//! SHA-256 digests
//!
//! Used for stable, content-derived identifiers such as the runtime
//! namespace derived from a project's package name.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `content`.
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
