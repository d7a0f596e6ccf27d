//! Error types for strata storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Bucket does not exist.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Object does not exist in the bucket.
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound {
        /// The bucket that was searched.
        bucket: String,
        /// The missing object key.
        key: String,
    },

    /// Bucket, key, or collection name is not usable.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend temporarily unreachable.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Missing buckets, missing objects, and bad names are stable facts;
    /// I/O, database, and availability failures are worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Database(_) | Self::Unavailable(_)
        )
    }
}
