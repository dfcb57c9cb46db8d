//! Storage trait definitions

use crate::parse::ParsedSentence;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stores that can be opened from a path or created in memory
pub trait OpenStore: Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (for testing)
    fn open_in_memory() -> StorageResult<Self>;
}

/// Persistent memo of analyzer output keyed by sentence text
///
/// Writes are idempotent upserts: storing the same sentence twice is not an
/// error and leaves one entry.
pub trait ParseCache: Send + Sync {
    /// Cached parse for `sentence`; `None` when absent
    fn get(&self, sentence: &str) -> StorageResult<Option<ParsedSentence>>;

    /// Store (or replace) the parse for `sentence`
    fn put(&self, sentence: &str, parsed: &ParsedSentence) -> StorageResult<()>;

    /// Number of cached sentences
    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Cache key for a sentence: lowercase hex SHA-256 of its UTF-8 bytes
pub fn cache_key(sentence: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sentence.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_sha256_hex() {
        assert_eq!(
            cache_key(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(cache_key("熊が泳ぐ").len(), 64);
        assert_ne!(cache_key("熊が泳ぐ"), cache_key("熊が泳ぐ。"));
    }
}
