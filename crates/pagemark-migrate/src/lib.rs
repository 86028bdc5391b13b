//! Migration and merge engine for Pagemark annotation data.
//!
//! Moves, copies, or merges whole per-(user, document) aggregates across
//! user identities, and provides the audit sweeps that go with bulk data
//! movement: per-user deletion, integrity validation, and count reporting.
//!
//! # Key Types
//!
//! - [`MigrationEngine`] — the engine; borrows an
//!   [`AnnotationStore`](pagemark_store::AnnotationStore)
//! - [`MigrationOptions`] — overwrite/preserve flags plus optional document
//!   and annotation predicates
//! - [`MigrationReport`], [`DeletionReport`], [`IntegrityReport`],
//!   [`UserDataStats`] — batch outcomes
//!
//! # Design Rules
//!
//! 1. Parameter errors fail the whole call before any document is touched.
//! 2. Everything after that is best-effort per document: failures land in
//!    the report's error list, the sweep continues, and committed documents
//!    are never rolled back.
//! 3. Merging two aggregates for the same document keeps every target entry;
//!    a source entry whose ID already exists in the target is dropped.

pub mod engine;
pub mod error;
pub mod options;
pub mod report;

pub use engine::MigrationEngine;
pub use error::{MigrationError, MigrationResult};
pub use options::{AnnotationFilter, AnnotationRef, DocumentFilter, MigrationOptions};
pub use report::{
    DeletionReport, DocumentFailure, DocumentStats, IntegrityReport, IntegrityViolation,
    MigrationReport, UserDataStats,
};
