//! Domain manager for Pagemark annotations.
//!
//! Sits between callers and the storage substrate: checks identifiers,
//! enforces domain invariants on every create and update, resolves
//! annotations by ID, and performs every mutation as a read-modify-write of
//! the whole per-(user, document) aggregate.
//!
//! # Key Types
//!
//! - [`AnnotationManager`] — per-kind CRUD plus aggregate queries over any
//!   [`KeyValueBackend`](pagemark_store::KeyValueBackend)
//! - [`ManagerError`] — identifier, validation, not-found, and storage
//!   failures as one enum
//!
//! # Design Rules
//!
//! 1. No operation writes anything when its inputs fail validation.
//! 2. Updates and deletes of an absent ID return
//!    [`ManagerError::NotFound`] and leave storage untouched.
//! 3. Updates preserve the annotation's position in its list.

pub mod error;
pub mod manager;

pub use error::{ManagerError, ManagerResult};
pub use manager::AnnotationManager;
