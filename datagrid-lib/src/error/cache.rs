//! Cache error types

/// Errors that can occur while reading or writing cached values.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Value could not be serialized for storage.
    #[error("cache serialization error: {0}")]
    Serialization(serde_json::Error),

    /// Stored bytes could not be deserialized.
    #[error("cache deserialization error: {0}")]
    Deserialization(serde_json::Error),
}
