//! Key-Value Store Port - durable client-side storage.
//!
//! The dashboard persists three named entries (domain context, segments,
//! reviews) as serialized JSON strings. Reads happen once at start-up; writes
//! replace an entry wholesale.

use async_trait::async_trait;

/// Entry names used by the dashboard store.
pub mod keys {
    pub const DOMAIN_CONTEXT: &str = "retail_dna_domain_context";
    pub const SEGMENTS: &str = "retail_dna_segments";
    pub const REVIEWS: &str = "retail_dna_reviews";

    /// Every entry the dashboard owns.
    pub const ALL: [&str; 3] = [DOMAIN_CONTEXT, SEGMENTS, REVIEWS];
}

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to serialize entry '{key}': {message}")]
    SerializationFailed { key: String, message: String },

    #[error("Failed to deserialize entry '{key}': {message}")]
    DeserializationFailed { key: String, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Port for reading and writing named string entries
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read an entry, `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace an entry.
    async fn put(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete an entry; missing entries are not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
