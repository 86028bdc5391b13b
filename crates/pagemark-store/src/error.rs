use pagemark_types::ValidationError;

/// Errors from storage substrate operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user identifier was missing or empty.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// A document identifier was missing or empty.
    #[error("document id must not be empty")]
    EmptyDocumentId,

    /// The aggregate failed domain validation before a write.
    #[error("annotation set failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// JSON encode failure on write.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Projected usage still exceeds the quota after eviction.
    #[error("storage quota exceeded: {needed} bytes needed, {max} bytes available")]
    QuotaExceeded { needed: u64, max: u64 },

    /// The underlying backend failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// I/O error from a file-backed backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
