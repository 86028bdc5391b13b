//! The domain manager: one create/update/delete/query surface per annotation
//! kind, with every mutation funneled through the storage substrate as a
//! read-modify-write of the whole aggregate.

use tracing::debug;

use pagemark_store::{AnnotationStore, KeyValueBackend};
use pagemark_types::{
    validate_bookmark, validate_call_to_action, validate_comment, validate_highlight,
    AnnotationCounts, AnnotationKind, Bookmark, BookmarkPatch, CallToAction, CallToActionPatch,
    Comment, CommentPatch, Highlight, HighlightPatch, NewBookmark, NewCallToAction, NewComment,
    NewHighlight, UserAnnotations,
};

use crate::error::{ManagerError, ManagerResult};

/// Business-rule gatekeeper for annotation mutations.
///
/// Takes the storage substrate as an explicit constructor argument; there is
/// no global instance. Every operation checks its identifiers before touching
/// storage, validates domain invariants before every write, and never bypasses
/// the substrate.
pub struct AnnotationManager<B: KeyValueBackend> {
    store: AnnotationStore<B>,
}

impl<B: KeyValueBackend> AnnotationManager<B> {
    /// Create a manager over the given store.
    pub fn new(store: AnnotationStore<B>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &AnnotationStore<B> {
        &self.store
    }

    // ---- Highlights ----

    /// Validate and persist a new highlight, returning the stored value.
    pub fn create_highlight(
        &self,
        user_id: &str,
        document_id: &str,
        input: NewHighlight,
    ) -> ManagerResult<Highlight> {
        check_scope(user_id, document_id)?;
        let highlight = Highlight::create(user_id, document_id, input);
        validate_highlight(&highlight)?;

        let mut set = self.store.load(user_id, document_id)?;
        set.highlights.push(highlight.clone());
        self.store.save(user_id, document_id, &set)?;
        debug!(user = user_id, document = document_id, id = %highlight.id, "created highlight");
        Ok(highlight)
    }

    /// Apply a partial update to a highlight, preserving its list position.
    pub fn update_highlight(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
        patch: HighlightPatch,
    ) -> ManagerResult<Highlight> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let index = position_by_id(&set.highlights, |h| &h.id, id, AnnotationKind::Highlight)?;
        let mut updated = set.highlights[index].clone();
        updated.apply(patch);
        validate_highlight(&updated)?;
        set.highlights[index] = updated.clone();
        self.store.save(user_id, document_id, &set)?;
        Ok(updated)
    }

    /// Remove a highlight by ID.
    pub fn delete_highlight(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
    ) -> ManagerResult<()> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let before = set.highlights.len();
        set.highlights.retain(|h| h.id != id);
        if set.highlights.len() == before {
            return Err(not_found(AnnotationKind::Highlight, id));
        }
        self.store.save(user_id, document_id, &set)?;
        Ok(())
    }

    /// Highlights on a single page, in insertion order.
    pub fn highlights_by_page(
        &self,
        user_id: &str,
        document_id: &str,
        page_number: u32,
    ) -> ManagerResult<Vec<Highlight>> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set
            .highlights
            .into_iter()
            .filter(|h| h.page_number == page_number)
            .collect())
    }

    // ---- Bookmarks ----

    /// Validate and persist a new bookmark, returning the stored value.
    pub fn create_bookmark(
        &self,
        user_id: &str,
        document_id: &str,
        input: NewBookmark,
    ) -> ManagerResult<Bookmark> {
        check_scope(user_id, document_id)?;
        let bookmark = Bookmark::create(user_id, document_id, input);
        validate_bookmark(&bookmark)?;

        let mut set = self.store.load(user_id, document_id)?;
        set.bookmarks.push(bookmark.clone());
        self.store.save(user_id, document_id, &set)?;
        debug!(user = user_id, document = document_id, id = %bookmark.id, "created bookmark");
        Ok(bookmark)
    }

    /// Apply a partial update to a bookmark, preserving its list position.
    pub fn update_bookmark(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
        patch: BookmarkPatch,
    ) -> ManagerResult<Bookmark> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let index = position_by_id(&set.bookmarks, |b| &b.id, id, AnnotationKind::Bookmark)?;
        let mut updated = set.bookmarks[index].clone();
        updated.apply(patch);
        validate_bookmark(&updated)?;
        set.bookmarks[index] = updated.clone();
        self.store.save(user_id, document_id, &set)?;
        Ok(updated)
    }

    /// Remove a bookmark by ID.
    pub fn delete_bookmark(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
    ) -> ManagerResult<()> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let before = set.bookmarks.len();
        set.bookmarks.retain(|b| b.id != id);
        if set.bookmarks.len() == before {
            return Err(not_found(AnnotationKind::Bookmark, id));
        }
        self.store.save(user_id, document_id, &set)?;
        Ok(())
    }

    /// Bookmarks on a single page, in insertion order.
    pub fn bookmarks_by_page(
        &self,
        user_id: &str,
        document_id: &str,
        page_number: u32,
    ) -> ManagerResult<Vec<Bookmark>> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set
            .bookmarks
            .into_iter()
            .filter(|b| b.page_number == page_number)
            .collect())
    }

    // ---- Comments ----

    /// Validate and persist a new comment, returning the stored value.
    pub fn create_comment(
        &self,
        user_id: &str,
        document_id: &str,
        input: NewComment,
    ) -> ManagerResult<Comment> {
        check_scope(user_id, document_id)?;
        let comment = Comment::create(user_id, document_id, input);
        validate_comment(&comment)?;

        let mut set = self.store.load(user_id, document_id)?;
        set.comments.push(comment.clone());
        self.store.save(user_id, document_id, &set)?;
        debug!(user = user_id, document = document_id, id = %comment.id, "created comment");
        Ok(comment)
    }

    /// Apply a partial update to a comment, preserving its list position.
    pub fn update_comment(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
        patch: CommentPatch,
    ) -> ManagerResult<Comment> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let index = position_by_id(&set.comments, |c| &c.id, id, AnnotationKind::Comment)?;
        let mut updated = set.comments[index].clone();
        updated.apply(patch);
        validate_comment(&updated)?;
        set.comments[index] = updated.clone();
        self.store.save(user_id, document_id, &set)?;
        Ok(updated)
    }

    /// Remove a comment by ID.
    pub fn delete_comment(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
    ) -> ManagerResult<()> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let before = set.comments.len();
        set.comments.retain(|c| c.id != id);
        if set.comments.len() == before {
            return Err(not_found(AnnotationKind::Comment, id));
        }
        self.store.save(user_id, document_id, &set)?;
        Ok(())
    }

    /// Comments on a single page, in insertion order.
    pub fn comments_by_page(
        &self,
        user_id: &str,
        document_id: &str,
        page_number: u32,
    ) -> ManagerResult<Vec<Comment>> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set
            .comments
            .into_iter()
            .filter(|c| c.page_number == page_number)
            .collect())
    }

    // ---- Call-to-actions ----

    /// Validate and persist a new call-to-action, returning the stored value.
    pub fn create_call_to_action(
        &self,
        user_id: &str,
        document_id: &str,
        input: NewCallToAction,
    ) -> ManagerResult<CallToAction> {
        check_scope(user_id, document_id)?;
        let cta = CallToAction::create(user_id, document_id, input);
        validate_call_to_action(&cta)?;

        let mut set = self.store.load(user_id, document_id)?;
        set.call_to_actions.push(cta.clone());
        self.store.save(user_id, document_id, &set)?;
        debug!(user = user_id, document = document_id, id = %cta.id, "created call-to-action");
        Ok(cta)
    }

    /// Apply a partial update to a call-to-action, preserving its list position.
    pub fn update_call_to_action(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
        patch: CallToActionPatch,
    ) -> ManagerResult<CallToAction> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let index = position_by_id(
            &set.call_to_actions,
            |c| &c.id,
            id,
            AnnotationKind::CallToAction,
        )?;
        let mut updated = set.call_to_actions[index].clone();
        updated.apply(patch);
        validate_call_to_action(&updated)?;
        set.call_to_actions[index] = updated.clone();
        self.store.save(user_id, document_id, &set)?;
        Ok(updated)
    }

    /// Remove a call-to-action by ID.
    pub fn delete_call_to_action(
        &self,
        user_id: &str,
        document_id: &str,
        id: &str,
    ) -> ManagerResult<()> {
        check_scope(user_id, document_id)?;
        check_annotation_id(id)?;

        let mut set = self.store.load(user_id, document_id)?;
        let before = set.call_to_actions.len();
        set.call_to_actions.retain(|c| c.id != id);
        if set.call_to_actions.len() == before {
            return Err(not_found(AnnotationKind::CallToAction, id));
        }
        self.store.save(user_id, document_id, &set)?;
        Ok(())
    }

    /// Call-to-actions on a single page, in insertion order.
    pub fn call_to_actions_by_page(
        &self,
        user_id: &str,
        document_id: &str,
        page_number: u32,
    ) -> ManagerResult<Vec<CallToAction>> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set
            .call_to_actions
            .into_iter()
            .filter(|c| c.page_number == page_number)
            .collect())
    }

    // ---- Aggregate operations ----

    /// The full aggregate for one (user, document) pair.
    pub fn annotations(&self, user_id: &str, document_id: &str) -> ManagerResult<UserAnnotations> {
        check_scope(user_id, document_id)?;
        Ok(self.store.load(user_id, document_id)?)
    }

    /// The aggregate restricted to one page.
    pub fn annotations_by_page(
        &self,
        user_id: &str,
        document_id: &str,
        page_number: u32,
    ) -> ManagerResult<UserAnnotations> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set.for_page(page_number))
    }

    /// Per-kind counts for one (user, document) pair.
    pub fn annotation_counts(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> ManagerResult<AnnotationCounts> {
        check_scope(user_id, document_id)?;
        let set = self.store.load(user_id, document_id)?;
        Ok(set.counts())
    }

    /// Remove the whole aggregate. Returns `true` if anything was stored.
    pub fn delete_all_annotations(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> ManagerResult<bool> {
        check_scope(user_id, document_id)?;
        Ok(self.store.delete(user_id, document_id)?)
    }

    /// Returns `true` if an aggregate exists for `(user_id, document_id)`.
    pub fn has_annotations(&self, user_id: &str, document_id: &str) -> ManagerResult<bool> {
        check_scope(user_id, document_id)?;
        Ok(self.store.has_annotations(user_id, document_id)?)
    }

    /// Document identifiers with stored annotations for `user_id`.
    pub fn user_documents(&self, user_id: &str) -> ManagerResult<Vec<String>> {
        if user_id.trim().is_empty() {
            return Err(ManagerError::EmptyUserId);
        }
        Ok(self.store.list_documents(user_id)?)
    }
}

impl<B: KeyValueBackend> std::fmt::Debug for AnnotationManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationManager").finish()
    }
}

fn check_scope(user_id: &str, document_id: &str) -> ManagerResult<()> {
    if user_id.trim().is_empty() {
        return Err(ManagerError::EmptyUserId);
    }
    if document_id.trim().is_empty() {
        return Err(ManagerError::EmptyDocumentId);
    }
    Ok(())
}

fn check_annotation_id(id: &str) -> ManagerResult<()> {
    if id.trim().is_empty() {
        return Err(ManagerError::EmptyAnnotationId);
    }
    Ok(())
}

fn not_found(kind: AnnotationKind, id: &str) -> ManagerError {
    ManagerError::NotFound {
        kind,
        id: id.to_owned(),
    }
}

fn position_by_id<T>(
    list: &[T],
    id_of: impl Fn(&T) -> &String,
    id: &str,
    kind: AnnotationKind,
) -> ManagerResult<usize> {
    list.iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| not_found(kind, id))
}

#[cfg(test)]
mod tests {
    use pagemark_store::MemoryBackend;
    use pagemark_types::{Point, Rect};

    use super::*;

    fn manager() -> AnnotationManager<MemoryBackend> {
        AnnotationManager::new(AnnotationStore::new(MemoryBackend::new()))
    }

    fn highlight_input() -> NewHighlight {
        NewHighlight {
            page_number: 1,
            start_offset: 0,
            end_offset: 5,
            selected_text: "Hello".into(),
            color: "#ffff00".into(),
            rect: Rect::new(10.0, 20.0, 100.0, 20.0),
        }
    }

    fn comment_input(page: u32) -> NewComment {
        NewComment {
            page_number: page,
            content: "note".into(),
            position: Point::new(1.0, 2.0),
        }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[test]
    fn create_highlight_persists_and_returns_it() {
        let manager = manager();
        let created = manager.create_highlight("u1", "d1", highlight_input()).unwrap();

        let set = manager.annotations("u1", "d1").unwrap();
        assert_eq!(set.highlights.len(), 1);
        assert_eq!(set.highlights[0].color, "#ffff00");
        assert_eq!(set.highlights[0].id, created.id);
    }

    #[test]
    fn create_invalid_call_to_action_leaves_storage_unchanged() {
        let manager = manager();
        let err = manager
            .create_call_to_action(
                "u1",
                "d1",
                NewCallToAction {
                    page_number: 1,
                    url: "not-a-url".into(),
                    label: "Label".into(),
                    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                },
            )
            .unwrap_err();

        assert!(matches!(err, ManagerError::InvalidAnnotation(_)));
        assert!(!manager.has_annotations("u1", "d1").unwrap());
    }

    #[test]
    fn create_requires_non_empty_scope() {
        let manager = manager();
        assert!(matches!(
            manager.create_highlight("", "d1", highlight_input()),
            Err(ManagerError::EmptyUserId)
        ));
        assert!(matches!(
            manager.create_highlight("u1", "", highlight_input()),
            Err(ManagerError::EmptyDocumentId)
        ));
    }

    #[test]
    fn creates_append_in_insertion_order() {
        let manager = manager();
        let a = manager.create_comment("u1", "d1", comment_input(1)).unwrap();
        let b = manager.create_comment("u1", "d1", comment_input(1)).unwrap();

        let set = manager.annotations("u1", "d1").unwrap();
        assert_eq!(set.comments[0].id, a.id);
        assert_eq!(set.comments[1].id, b.id);
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn update_patches_only_named_fields_and_refreshes_updated_at() {
        let manager = manager();
        let created = manager.create_highlight("u1", "d1", highlight_input()).unwrap();

        let updated = manager
            .update_highlight(
                "u1",
                "d1",
                &created.id,
                HighlightPatch {
                    color: Some("#00ff00".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.color, "#00ff00");
        assert_eq!(updated.selected_text, created.selected_text);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = manager.annotations("u1", "d1").unwrap();
        assert_eq!(stored.highlights[0], updated);
    }

    #[test]
    fn update_preserves_list_position() {
        let manager = manager();
        let first = manager.create_comment("u1", "d1", comment_input(1)).unwrap();
        let second = manager.create_comment("u1", "d1", comment_input(2)).unwrap();

        manager
            .update_comment(
                "u1",
                "d1",
                &first.id,
                CommentPatch {
                    content: Some("edited".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let set = manager.annotations("u1", "d1").unwrap();
        assert_eq!(set.comments[0].id, first.id);
        assert_eq!(set.comments[0].content, "edited");
        assert_eq!(set.comments[1].id, second.id);
    }

    #[test]
    fn update_missing_id_is_not_found_without_write() {
        let manager = manager();
        manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        let before = manager.annotations("u1", "d1").unwrap();

        let err = manager
            .update_highlight("u1", "d1", "nonexistent-id", HighlightPatch::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ManagerError::NotFound {
                kind: AnnotationKind::Highlight,
                ..
            }
        ));
        assert_eq!(manager.annotations("u1", "d1").unwrap(), before);
    }

    #[test]
    fn update_that_breaks_invariants_is_rejected_without_write() {
        let manager = manager();
        let created = manager.create_highlight("u1", "d1", highlight_input()).unwrap();

        let err = manager
            .update_highlight(
                "u1",
                "d1",
                &created.id,
                HighlightPatch {
                    color: Some("nope".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, ManagerError::InvalidAnnotation(_)));

        let stored = manager.annotations("u1", "d1").unwrap();
        assert_eq!(stored.highlights[0].color, "#ffff00");
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[test]
    fn delete_removes_exactly_one_and_leaves_other_lists() {
        let manager = manager();
        let h = manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        manager.create_comment("u1", "d1", comment_input(1)).unwrap();

        manager.delete_highlight("u1", "d1", &h.id).unwrap();

        let set = manager.annotations("u1", "d1").unwrap();
        assert_eq!(set.highlights.len(), 1);
        assert_eq!(set.comments.len(), 1);
        assert!(set.highlights.iter().all(|x| x.id != h.id));
    }

    #[test]
    fn delete_missing_id_is_not_found_and_storage_unchanged() {
        let manager = manager();
        manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        let before = manager.annotations("u1", "d1").unwrap();

        let err = manager.delete_highlight("u1", "d1", "nonexistent-id").unwrap_err();
        assert!(matches!(err, ManagerError::NotFound { .. }));
        assert_eq!(manager.annotations("u1", "d1").unwrap(), before);
    }

    #[test]
    fn delete_requires_annotation_id() {
        let manager = manager();
        assert!(matches!(
            manager.delete_bookmark("u1", "d1", "  "),
            Err(ManagerError::EmptyAnnotationId)
        ));
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn by_page_queries_filter_each_kind() {
        let manager = manager();
        manager.create_comment("u1", "d1", comment_input(1)).unwrap();
        manager.create_comment("u1", "d1", comment_input(2)).unwrap();
        manager
            .create_bookmark(
                "u1",
                "d1",
                NewBookmark {
                    page_number: 2,
                    title: "t".into(),
                    description: None,
                },
            )
            .unwrap();

        assert_eq!(manager.comments_by_page("u1", "d1", 1).unwrap().len(), 1);
        assert_eq!(manager.comments_by_page("u1", "d1", 2).unwrap().len(), 1);
        assert_eq!(manager.bookmarks_by_page("u1", "d1", 1).unwrap().len(), 0);

        let page2 = manager.annotations_by_page("u1", "d1", 2).unwrap();
        assert_eq!(page2.comments.len(), 1);
        assert_eq!(page2.bookmarks.len(), 1);
        assert!(page2.highlights.is_empty());
    }

    #[test]
    fn counts_and_has_annotations() {
        let manager = manager();
        assert!(!manager.has_annotations("u1", "d1").unwrap());
        assert_eq!(manager.annotation_counts("u1", "d1").unwrap().total(), 0);

        manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        manager.create_comment("u1", "d1", comment_input(1)).unwrap();

        let counts = manager.annotation_counts("u1", "d1").unwrap();
        assert_eq!(counts.highlights, 1);
        assert_eq!(counts.comments, 1);
        assert_eq!(counts.total(), 2);
        assert!(manager.has_annotations("u1", "d1").unwrap());
    }

    #[test]
    fn delete_all_annotations_removes_the_aggregate() {
        let manager = manager();
        manager.create_highlight("u1", "d1", highlight_input()).unwrap();

        assert!(manager.delete_all_annotations("u1", "d1").unwrap());
        assert!(!manager.has_annotations("u1", "d1").unwrap());
        assert!(!manager.delete_all_annotations("u1", "d1").unwrap());
    }

    #[test]
    fn user_documents_lists_only_that_user() {
        let manager = manager();
        manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        manager.create_highlight("u1", "d2", highlight_input()).unwrap();
        manager.create_highlight("u2", "d3", highlight_input()).unwrap();

        assert_eq!(manager.user_documents("u1").unwrap(), vec!["d1", "d2"]);
        assert_eq!(manager.user_documents("u2").unwrap(), vec!["d3"]);
    }

    #[test]
    fn operations_are_isolated_between_scopes() {
        let manager = manager();
        let ours = manager.create_highlight("u1", "d1", highlight_input()).unwrap();
        manager.create_highlight("u2", "d1", highlight_input()).unwrap();
        manager.create_highlight("u1", "d2", highlight_input()).unwrap();

        manager.delete_highlight("u1", "d1", &ours.id).unwrap();

        assert_eq!(manager.annotations("u2", "d1").unwrap().highlights.len(), 1);
        assert_eq!(manager.annotations("u1", "d2").unwrap().highlights.len(), 1);
    }
}
