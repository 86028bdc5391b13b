use std::fmt;

use pagemark_types::{AnnotationKind, Bookmark, CallToAction, Comment, Highlight};

/// Borrowed view of any annotation kind, used by the annotation filter.
#[derive(Debug, Clone, Copy)]
pub enum AnnotationRef<'a> {
    Highlight(&'a Highlight),
    Bookmark(&'a Bookmark),
    Comment(&'a Comment),
    CallToAction(&'a CallToAction),
}

impl AnnotationRef<'_> {
    /// The kind of the referenced annotation.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationRef::Highlight(_) => AnnotationKind::Highlight,
            AnnotationRef::Bookmark(_) => AnnotationKind::Bookmark,
            AnnotationRef::Comment(_) => AnnotationKind::Comment,
            AnnotationRef::CallToAction(_) => AnnotationKind::CallToAction,
        }
    }

    /// The referenced annotation's identifier.
    pub fn id(&self) -> &str {
        match self {
            AnnotationRef::Highlight(h) => &h.id,
            AnnotationRef::Bookmark(b) => &b.id,
            AnnotationRef::Comment(c) => &c.id,
            AnnotationRef::CallToAction(c) => &c.id,
        }
    }

    /// The page the referenced annotation lives on.
    pub fn page_number(&self) -> u32 {
        match self {
            AnnotationRef::Highlight(h) => h.page_number,
            AnnotationRef::Bookmark(b) => b.page_number,
            AnnotationRef::Comment(c) => c.page_number,
            AnnotationRef::CallToAction(c) => c.page_number,
        }
    }

    /// The owning user recorded on the referenced annotation.
    pub fn user_id(&self) -> &str {
        match self {
            AnnotationRef::Highlight(h) => &h.user_id,
            AnnotationRef::Bookmark(b) => &b.user_id,
            AnnotationRef::Comment(c) => &c.user_id,
            AnnotationRef::CallToAction(c) => &c.user_id,
        }
    }

    /// The owning document recorded on the referenced annotation.
    pub fn document_id(&self) -> &str {
        match self {
            AnnotationRef::Highlight(h) => &h.document_id,
            AnnotationRef::Bookmark(b) => &b.document_id,
            AnnotationRef::Comment(c) => &c.document_id,
            AnnotationRef::CallToAction(c) => &c.document_id,
        }
    }
}

/// Per-document filter: keep documents for which the predicate returns `true`.
pub type DocumentFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Per-annotation filter: keep annotations for which the predicate returns
/// `true`.
pub type AnnotationFilter = Box<dyn Fn(&AnnotationRef<'_>) -> bool + Send + Sync>;

/// Knobs for a migration run.
///
/// The defaults move everything: no filters, merge into existing target
/// aggregates, delete the source afterwards.
pub struct MigrationOptions {
    /// Replace an existing target aggregate instead of merging into it.
    pub overwrite_existing: bool,
    /// Leave the source aggregates in place after migrating.
    pub preserve_original: bool,
    /// Restrict the run to documents matching this predicate.
    pub document_filter: Option<DocumentFilter>,
    /// Restrict the run to annotations matching this predicate.
    pub annotation_filter: Option<AnnotationFilter>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            overwrite_existing: false,
            preserve_original: false,
            document_filter: None,
            annotation_filter: None,
        }
    }
}

impl fmt::Debug for MigrationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationOptions")
            .field("overwrite_existing", &self.overwrite_existing)
            .field("preserve_original", &self.preserve_original)
            .field("document_filter", &self.document_filter.is_some())
            .field("annotation_filter", &self.annotation_filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pagemark_types::{NewHighlight, Rect};

    use super::*;

    #[test]
    fn annotation_ref_accessors() {
        let h = Highlight::create(
            "u1",
            "d1",
            NewHighlight {
                page_number: 4,
                start_offset: 0,
                end_offset: 1,
                selected_text: "x".into(),
                color: "#112233".into(),
                rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            },
        );
        let r = AnnotationRef::Highlight(&h);
        assert_eq!(r.kind(), AnnotationKind::Highlight);
        assert_eq!(r.id(), h.id);
        assert_eq!(r.page_number(), 4);
    }

    #[test]
    fn default_options_move_everything() {
        let options = MigrationOptions::default();
        assert!(!options.overwrite_existing);
        assert!(!options.preserve_original);
        assert!(options.document_filter.is_none());
        assert!(options.annotation_filter.is_none());
    }

    #[test]
    fn debug_reports_filter_presence_not_contents() {
        let options = MigrationOptions {
            document_filter: Some(Box::new(|d| d.starts_with("report-"))),
            ..Default::default()
        };
        let rendered = format!("{options:?}");
        assert!(rendered.contains("document_filter: true"));
        assert!(rendered.contains("annotation_filter: false"));
    }
}
