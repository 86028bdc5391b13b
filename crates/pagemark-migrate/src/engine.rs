//! The migration engine: relocates, copies, and merges whole annotation
//! aggregates across user identities, plus the audit and reporting sweeps
//! that go with them.

use std::collections::HashSet;

use tracing::{debug, warn};

use pagemark_store::{AnnotationStore, KeyValueBackend, StoreResult};
use pagemark_types::{AnnotationCounts, UserAnnotations};

use crate::error::{MigrationError, MigrationResult};
use crate::options::{AnnotationRef, MigrationOptions};
use crate::report::{
    DeletionReport, DocumentFailure, DocumentStats, IntegrityReport, IntegrityViolation,
    MigrationReport, UserDataStats,
};

/// Moves annotation data between user identities.
///
/// Borrows the store; parameter checks run before any document is touched,
/// and every multi-document sweep is best-effort per document. A failed
/// document is recorded in the report and the sweep continues; documents
/// already migrated stay committed.
pub struct MigrationEngine<'a, B: KeyValueBackend> {
    store: &'a AnnotationStore<B>,
}

impl<'a, B: KeyValueBackend> MigrationEngine<'a, B> {
    /// Create an engine over the given store.
    pub fn new(store: &'a AnnotationStore<B>) -> Self {
        Self { store }
    }

    /// Move every document aggregate owned by `from` to `to`.
    ///
    /// Per document: load the source, apply filters, rewrite the owner,
    /// merge into any existing target aggregate (target wins on ID
    /// collision) unless `overwrite_existing` is set, persist under the
    /// target key, then delete the source unless `preserve_original` is set.
    pub fn migrate_user_data(
        &self,
        from: &str,
        to: &str,
        options: &MigrationOptions,
    ) -> MigrationResult<MigrationReport> {
        check_pair(from, to)?;
        self.run(
            from,
            to,
            options,
            options.overwrite_existing,
            options.preserve_original,
        )
    }

    /// Like [`migrate_user_data`](Self::migrate_user_data), but always leaves
    /// the source aggregates in place.
    pub fn copy_user_data(
        &self,
        from: &str,
        to: &str,
        options: &MigrationOptions,
    ) -> MigrationResult<MigrationReport> {
        check_pair(from, to)?;
        self.run(from, to, options, options.overwrite_existing, true)
    }

    /// Migrate each source identity into `target` in turn, always merging
    /// into existing target aggregates, and fold the results into one report.
    pub fn merge_users_data(
        &self,
        sources: &[&str],
        target: &str,
        options: &MigrationOptions,
    ) -> MigrationResult<MigrationReport> {
        check_user(target)?;
        for source in sources {
            check_user(source)?;
            if *source == target {
                return Err(MigrationError::TargetInSources {
                    user_id: target.to_owned(),
                });
            }
        }

        let mut report = MigrationReport {
            success: true,
            ..Default::default()
        };
        for source in sources {
            report.absorb(self.run(source, target, options, false, options.preserve_original)?);
        }
        Ok(report)
    }

    /// Delete every document aggregate owned by `user_id`.
    pub fn delete_user_data(&self, user_id: &str) -> MigrationResult<DeletionReport> {
        check_user(user_id)?;

        let mut report = DeletionReport {
            success: true,
            ..Default::default()
        };
        for document_id in self.store.list_documents(user_id)? {
            match self.store.delete(user_id, &document_id) {
                Ok(_) => report.documents_deleted += 1,
                Err(e) => {
                    warn!(user = user_id, document = %document_id, error = %e, "deletion failed");
                    report.errors.push(DocumentFailure {
                        document_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.success = report.errors.is_empty();
        Ok(report)
    }

    /// Audit every stored annotation for `user_id`: its recorded owner and
    /// document must match the key it is stored under. Collects all
    /// violations instead of failing on the first.
    pub fn validate_user_data(&self, user_id: &str) -> MigrationResult<IntegrityReport> {
        check_user(user_id)?;

        let mut report = IntegrityReport {
            valid: true,
            ..Default::default()
        };
        for document_id in self.store.list_documents(user_id)? {
            let set = self.store.load(user_id, &document_id)?;
            report.documents_checked += 1;
            collect_violations(user_id, &document_id, &set, &mut report.violations);
        }
        report.valid = report.violations.is_empty();
        Ok(report)
    }

    /// Per-document and total annotation counts for `user_id`.
    pub fn user_data_stats(&self, user_id: &str) -> MigrationResult<UserDataStats> {
        check_user(user_id)?;

        let mut stats = UserDataStats::default();
        for document_id in self.store.list_documents(user_id)? {
            let counts = self.store.load(user_id, &document_id)?.counts();
            stats.total.merge(&counts);
            stats.documents.push(DocumentStats {
                document_id,
                counts,
            });
        }
        Ok(stats)
    }

    fn run(
        &self,
        from: &str,
        to: &str,
        options: &MigrationOptions,
        overwrite: bool,
        preserve: bool,
    ) -> MigrationResult<MigrationReport> {
        let documents = self.store.list_documents(from)?;

        let mut report = MigrationReport {
            success: true,
            ..Default::default()
        };
        for document_id in documents {
            if let Some(filter) = &options.document_filter {
                if !filter(&document_id) {
                    continue;
                }
            }
            match self.migrate_document(from, to, &document_id, options, overwrite, preserve) {
                Ok(written) => {
                    debug!(from, to, document = %document_id, migrated = written.total(), "migrated document");
                    report.documents_processed += 1;
                    report.migrated.merge(&written);
                }
                Err(e) => {
                    warn!(from, to, document = %document_id, error = %e, "document migration failed");
                    report.errors.push(DocumentFailure {
                        document_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report.success = report.errors.is_empty();
        Ok(report)
    }

    fn migrate_document(
        &self,
        from: &str,
        to: &str,
        document_id: &str,
        options: &MigrationOptions,
        overwrite: bool,
        preserve: bool,
    ) -> StoreResult<AnnotationCounts> {
        let mut source = self.store.load(from, document_id)?;
        if let Some(filter) = &options.annotation_filter {
            source
                .highlights
                .retain(|h| filter(&AnnotationRef::Highlight(h)));
            source
                .bookmarks
                .retain(|b| filter(&AnnotationRef::Bookmark(b)));
            source
                .comments
                .retain(|c| filter(&AnnotationRef::Comment(c)));
            source
                .call_to_actions
                .retain(|c| filter(&AnnotationRef::CallToAction(c)));
        }
        source.set_user_id(to);

        let (outgoing, written) = if !overwrite && self.store.has_annotations(to, document_id)? {
            let target = self.store.load(to, document_id)?;
            merge_into(target, source)
        } else {
            let written = source.counts();
            (source, written)
        };

        self.store.save(to, document_id, &outgoing)?;
        if !preserve {
            self.store.delete(from, document_id)?;
        }
        Ok(written)
    }
}

impl<B: KeyValueBackend> std::fmt::Debug for MigrationEngine<'_, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEngine").finish()
    }
}

fn check_user(user_id: &str) -> MigrationResult<()> {
    if user_id.trim().is_empty() {
        return Err(MigrationError::EmptyUserId);
    }
    Ok(())
}

fn check_pair(from: &str, to: &str) -> MigrationResult<()> {
    check_user(from)?;
    check_user(to)?;
    if from == to {
        return Err(MigrationError::SameUser);
    }
    Ok(())
}

/// Merge `source` into `target`: keep every target entry, append source
/// entries whose ID does not already appear in the target list. Returns the
/// merged aggregate and the counts actually appended.
fn merge_into(
    target: UserAnnotations,
    source: UserAnnotations,
) -> (UserAnnotations, AnnotationCounts) {
    let mut merged = target;
    let mut written = AnnotationCounts::default();

    let existing: HashSet<String> = merged.highlights.iter().map(|h| h.id.clone()).collect();
    for highlight in source.highlights {
        if !existing.contains(&highlight.id) {
            merged.highlights.push(highlight);
            written.highlights += 1;
        }
    }

    let existing: HashSet<String> = merged.bookmarks.iter().map(|b| b.id.clone()).collect();
    for bookmark in source.bookmarks {
        if !existing.contains(&bookmark.id) {
            merged.bookmarks.push(bookmark);
            written.bookmarks += 1;
        }
    }

    let existing: HashSet<String> = merged.comments.iter().map(|c| c.id.clone()).collect();
    for comment in source.comments {
        if !existing.contains(&comment.id) {
            merged.comments.push(comment);
            written.comments += 1;
        }
    }

    let existing: HashSet<String> = merged
        .call_to_actions
        .iter()
        .map(|c| c.id.clone())
        .collect();
    for cta in source.call_to_actions {
        if !existing.contains(&cta.id) {
            merged.call_to_actions.push(cta);
            written.call_to_actions += 1;
        }
    }

    (merged, written)
}

fn collect_violations(
    expected_user: &str,
    expected_document: &str,
    set: &UserAnnotations,
    out: &mut Vec<IntegrityViolation>,
) {
    let members = set
        .highlights
        .iter()
        .map(AnnotationRef::Highlight)
        .chain(set.bookmarks.iter().map(AnnotationRef::Bookmark))
        .chain(set.comments.iter().map(AnnotationRef::Comment))
        .chain(set.call_to_actions.iter().map(AnnotationRef::CallToAction));

    for member in members {
        if member.user_id() != expected_user {
            out.push(IntegrityViolation {
                document_id: expected_document.to_owned(),
                kind: member.kind(),
                annotation_id: member.id().to_owned(),
                detail: format!(
                    "owner is {:?}, expected {:?}",
                    member.user_id(),
                    expected_user
                ),
            });
        }
        if member.document_id() != expected_document {
            out.push(IntegrityViolation {
                document_id: expected_document.to_owned(),
                kind: member.kind(),
                annotation_id: member.id().to_owned(),
                detail: format!(
                    "document is {:?}, expected {:?}",
                    member.document_id(),
                    expected_document
                ),
            });
        }
    }
}
