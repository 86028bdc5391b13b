use thiserror::Error;

use crate::counts::AnnotationKind;

/// A violated annotation invariant.
///
/// Produced by the validators in [`crate::validate`]. The validators are
/// authoritative for "is this object well-formed": the manager refuses to
/// persist anything they reject, and the storage substrate re-checks every
/// aggregate on load.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{kind} {field} must not be empty")]
    EmptyField {
        kind: AnnotationKind,
        field: &'static str,
    },

    #[error("{kind} page number must be at least 1")]
    InvalidPageNumber { kind: AnnotationKind },

    #[error("invalid highlight color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    #[error("highlight offsets out of order: start {start} > end {end}")]
    OffsetOrder { start: u32, end: u32 },

    #[error("invalid call-to-action url {0:?}: expected http:// or https://")]
    InvalidUrl(String),

    #[error("{kind} coordinates must be non-negative")]
    NegativeGeometry { kind: AnnotationKind },

    #[error("call-to-action region must have positive width and height")]
    EmptyRegion,

    #[error("duplicate {kind} id {id:?}")]
    DuplicateId { kind: AnnotationKind, id: String },
}
