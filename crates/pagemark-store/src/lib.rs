//! Quota-governed key-value persistence for Pagemark annotation sets.
//!
//! This crate owns the physical persisted representation: key naming,
//! serialization, byte-quota accounting, least-recently-used eviction, and
//! corruption recovery. It knows nothing about business rules beyond calling
//! the `pagemark-types` validators before accepting a write and after every
//! read.
//!
//! # Layout
//!
//! - [`KeyValueBackend`] — the raw storage seam: string keys to UTF-8 JSON
//!   values
//! - [`MemoryBackend`] — `HashMap`-based backend for tests and embedding
//! - [`FileBackend`] — one file per key under a root directory
//! - [`AnnotationStore`] — the substrate proper: save/load/delete/enumerate
//!   whole [`UserAnnotations`] aggregates with quota enforcement
//!
//! # Design Rules
//!
//! 1. The unit of read/write is the whole aggregate for one (user, document)
//!    pair; there are no per-annotation keys.
//! 2. Loading an absent key yields an empty aggregate, never an error.
//! 3. A stored blob that cannot be parsed or fails revalidation is discarded
//!    and replaced by an empty aggregate (self-heal); the caller never sees
//!    the corruption.
//! 4. Writes that would exceed the byte quota trigger LRU eviction first and
//!    fail without a partial write if eviction cannot make room.
//! 5. The store assumes a single logical writer. A concurrent host must
//!    serialize access per key externally.
//!
//! [`UserAnnotations`]: pagemark_types::UserAnnotations

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use backend::KeyValueBackend;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::{
    AnnotationStore, StorageMetadata, StorageStats, CLEANUP_TARGET_PERCENT,
    CLEANUP_TRIGGER_PERCENT, MAX_STORAGE_BYTES, METADATA_KEY, STORAGE_PREFIX,
};
