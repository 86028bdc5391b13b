use pagemark_store::StoreError;

/// Errors from migration engine operations.
///
/// Parameter errors are raised before any document is touched. Per-document
/// storage failures inside a batch are not errors at this level; they are
/// collected in the report's error list instead.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// A user identifier was missing or empty.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// Source and target identities are the same.
    #[error("source and target user must differ")]
    SameUser,

    /// The merge target also appears in the source list.
    #[error("target user {user_id:?} appears among the sources")]
    TargetInSources { user_id: String },

    /// The storage substrate failed before per-document processing began.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
