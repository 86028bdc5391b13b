//! Foundation types for the Pagemark annotation engine.
//!
//! This crate provides the four annotation kinds, their aggregate, and the
//! validators that define what a well-formed annotation is. Every other
//! Pagemark crate depends on `pagemark-types`.
//!
//! # Key Types
//!
//! - [`Highlight`], [`Bookmark`], [`Comment`], [`CallToAction`] — the four
//!   annotation kinds, each owned by exactly one aggregate
//! - [`UserAnnotations`] — the full annotation set for one (user, document)
//!   pair; the unit of read/write in the storage substrate
//! - [`AnnotationKind`] / [`AnnotationCounts`] — reporting helpers shared by
//!   the manager and the migration engine
//! - [`ValidationError`] — the authoritative verdict on well-formedness
//!
//! Construction goes through the `create` factories, which assign a UUID v7
//! identifier and both timestamps. Timestamps are `chrono::DateTime<Utc>` and
//! serialize as ISO-8601 strings; all persisted field names are camelCase.

pub mod aggregate;
pub mod annotation;
pub mod counts;
pub mod error;
pub mod geometry;
pub mod validate;

pub use aggregate::UserAnnotations;
pub use annotation::{
    Bookmark, BookmarkPatch, CallToAction, CallToActionPatch, Comment, CommentPatch, Highlight,
    HighlightPatch, NewBookmark, NewCallToAction, NewComment, NewHighlight, new_annotation_id,
};
pub use counts::{AnnotationCounts, AnnotationKind};
pub use error::ValidationError;
pub use geometry::{Point, Rect};
pub use validate::{
    validate_bookmark, validate_call_to_action, validate_comment, validate_highlight,
    validate_user_annotations,
};
