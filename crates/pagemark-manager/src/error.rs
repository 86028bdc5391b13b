use pagemark_store::StoreError;
use pagemark_types::{AnnotationKind, ValidationError};

/// Errors from domain manager operations.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// A user identifier was missing or empty.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// A document identifier was missing or empty.
    #[error("document id must not be empty")]
    EmptyDocumentId,

    /// An annotation identifier was missing or empty.
    #[error("annotation id must not be empty")]
    EmptyAnnotationId,

    /// A create or update violated a domain invariant. Nothing was written.
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(#[from] ValidationError),

    /// An update or delete referenced an ID that is not in the aggregate.
    #[error("{kind} {id:?} not found")]
    NotFound { kind: AnnotationKind, id: String },

    /// The storage substrate failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;
