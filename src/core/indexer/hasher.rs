//! Content hashing for change detection.

use sha2::{Digest, Sha256};

/// Computes stable digests of file content
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Lowercase hex SHA-256 of the content bytes
    pub fn hash(&self, content: &str) -> String {
        sha256_hex(content)
    }

    /// Digest of `content` if it differs from a previously stored one.
    ///
    /// A missing digest (file never indexed) counts as changed.
    /// Returns `None` when the content is unchanged.
    pub fn has_changed(&self, stored: Option<&str>, content: &str) -> Option<String> {
        let hash = self.hash(content);
        (stored != Some(hash.as_str())).then_some(hash)
    }
}

pub fn sha256_hex(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
