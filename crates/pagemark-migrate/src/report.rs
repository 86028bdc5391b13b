use serde::Serialize;

use pagemark_types::{AnnotationCounts, AnnotationKind};

/// A per-document failure recorded during a batch operation.
///
/// Batch operations never abort on a single document; each failure is
/// captured here and the remaining documents are still processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFailure {
    pub document_id: String,
    pub reason: String,
}

/// Outcome of a migrate, copy, or merge run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// `true` when every selected document migrated cleanly.
    pub success: bool,
    /// Documents migrated without error.
    pub documents_processed: usize,
    /// Annotations actually written to the target. Source entries dropped by
    /// an ID collision during merge are not counted.
    pub migrated: AnnotationCounts,
    pub errors: Vec<DocumentFailure>,
}

impl MigrationReport {
    /// Fold another report into this one, recomputing `success`.
    pub fn absorb(&mut self, other: MigrationReport) {
        self.documents_processed += other.documents_processed;
        self.migrated.merge(&other.migrated);
        self.errors.extend(other.errors);
        self.success = self.errors.is_empty();
    }
}

/// Outcome of a bulk per-user deletion sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub success: bool,
    pub documents_deleted: usize,
    pub errors: Vec<DocumentFailure>,
}

/// A stored annotation whose identity fields disagree with its storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityViolation {
    pub document_id: String,
    pub kind: AnnotationKind,
    pub annotation_id: String,
    pub detail: String,
}

/// Outcome of a consistency audit over one user's stored data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub valid: bool,
    pub documents_checked: usize,
    pub violations: Vec<IntegrityViolation>,
}

/// Per-document annotation counts for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub document_id: String,
    pub counts: AnnotationCounts,
}

/// Per-user annotation totals, broken down by document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataStats {
    pub documents: Vec<DocumentStats>,
    pub total: AnnotationCounts,
}

impl UserDataStats {
    /// Number of documents with stored annotations.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}
