//! Annotation validators.
//!
//! One validator per annotation kind plus one for the aggregate. Each checks
//! the invariants rule by rule and reports the first violation; the aggregate
//! validator additionally enforces ID uniqueness within each list.

use std::collections::HashSet;

use crate::aggregate::UserAnnotations;
use crate::annotation::{Bookmark, CallToAction, Comment, Highlight};
use crate::counts::AnnotationKind;
use crate::error::ValidationError;

fn check_shared_fields(
    kind: AnnotationKind,
    id: &str,
    user_id: &str,
    document_id: &str,
    page_number: u32,
) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyField { kind, field: "id" });
    }
    if user_id.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "userId",
        });
    }
    if document_id.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "documentId",
        });
    }
    if page_number < 1 {
        return Err(ValidationError::InvalidPageNumber { kind });
    }
    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_http_url(url: &str) -> bool {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty())
}

/// Validate a single highlight.
pub fn validate_highlight(highlight: &Highlight) -> Result<(), ValidationError> {
    let kind = AnnotationKind::Highlight;
    check_shared_fields(
        kind,
        &highlight.id,
        &highlight.user_id,
        &highlight.document_id,
        highlight.page_number,
    )?;
    if highlight.selected_text.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "selectedText",
        });
    }
    if !is_hex_color(&highlight.color) {
        return Err(ValidationError::InvalidColor(highlight.color.clone()));
    }
    if highlight.start_offset > highlight.end_offset {
        return Err(ValidationError::OffsetOrder {
            start: highlight.start_offset,
            end: highlight.end_offset,
        });
    }
    if !highlight.rect.is_non_negative() {
        return Err(ValidationError::NegativeGeometry { kind });
    }
    Ok(())
}

/// Validate a single bookmark.
pub fn validate_bookmark(bookmark: &Bookmark) -> Result<(), ValidationError> {
    let kind = AnnotationKind::Bookmark;
    check_shared_fields(
        kind,
        &bookmark.id,
        &bookmark.user_id,
        &bookmark.document_id,
        bookmark.page_number,
    )?;
    if bookmark.title.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "title",
        });
    }
    Ok(())
}

/// Validate a single comment.
pub fn validate_comment(comment: &Comment) -> Result<(), ValidationError> {
    let kind = AnnotationKind::Comment;
    check_shared_fields(
        kind,
        &comment.id,
        &comment.user_id,
        &comment.document_id,
        comment.page_number,
    )?;
    if comment.content.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "content",
        });
    }
    if !comment.position.is_non_negative() {
        return Err(ValidationError::NegativeGeometry { kind });
    }
    Ok(())
}

/// Validate a single call-to-action.
pub fn validate_call_to_action(cta: &CallToAction) -> Result<(), ValidationError> {
    let kind = AnnotationKind::CallToAction;
    check_shared_fields(kind, &cta.id, &cta.user_id, &cta.document_id, cta.page_number)?;
    if !is_http_url(&cta.url) {
        return Err(ValidationError::InvalidUrl(cta.url.clone()));
    }
    if cta.label.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            kind,
            field: "label",
        });
    }
    if !cta.rect.is_non_negative() {
        return Err(ValidationError::NegativeGeometry { kind });
    }
    if !cta.rect.has_area() {
        return Err(ValidationError::EmptyRegion);
    }
    Ok(())
}

fn check_unique_ids<'a, I>(kind: AnnotationKind, ids: I) -> Result<(), ValidationError>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                kind,
                id: id.to_owned(),
            });
        }
    }
    Ok(())
}

/// Validate a whole aggregate: every member and ID uniqueness per list.
pub fn validate_user_annotations(annotations: &UserAnnotations) -> Result<(), ValidationError> {
    for highlight in &annotations.highlights {
        validate_highlight(highlight)?;
    }
    for bookmark in &annotations.bookmarks {
        validate_bookmark(bookmark)?;
    }
    for comment in &annotations.comments {
        validate_comment(comment)?;
    }
    for cta in &annotations.call_to_actions {
        validate_call_to_action(cta)?;
    }

    check_unique_ids(
        AnnotationKind::Highlight,
        annotations.highlights.iter().map(|h| h.id.as_str()),
    )?;
    check_unique_ids(
        AnnotationKind::Bookmark,
        annotations.bookmarks.iter().map(|b| b.id.as_str()),
    )?;
    check_unique_ids(
        AnnotationKind::Comment,
        annotations.comments.iter().map(|c| c.id.as_str()),
    )?;
    check_unique_ids(
        AnnotationKind::CallToAction,
        annotations.call_to_actions.iter().map(|c| c.id.as_str()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::annotation::{NewBookmark, NewCallToAction, NewComment, NewHighlight};
    use crate::geometry::{Point, Rect};

    use super::*;

    fn highlight() -> Highlight {
        Highlight::create(
            "u1",
            "d1",
            NewHighlight {
                page_number: 1,
                start_offset: 0,
                end_offset: 5,
                selected_text: "Hello".into(),
                color: "#ffff00".into(),
                rect: Rect::new(10.0, 20.0, 100.0, 20.0),
            },
        )
    }

    fn cta() -> CallToAction {
        CallToAction::create(
            "u1",
            "d1",
            NewCallToAction {
                page_number: 1,
                url: "https://example.com".into(),
                label: "Visit".into(),
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            },
        )
    }

    // -----------------------------------------------------------------------
    // Highlight
    // -----------------------------------------------------------------------

    #[test]
    fn valid_highlight_passes() {
        assert_eq!(validate_highlight(&highlight()), Ok(()));
    }

    #[test]
    fn highlight_rejects_page_zero() {
        let mut h = highlight();
        h.page_number = 0;
        assert_eq!(
            validate_highlight(&h),
            Err(ValidationError::InvalidPageNumber {
                kind: AnnotationKind::Highlight
            })
        );
    }

    #[test]
    fn highlight_rejects_whitespace_text() {
        let mut h = highlight();
        h.selected_text = "   ".into();
        assert!(matches!(
            validate_highlight(&h),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn highlight_rejects_bad_colors() {
        for color in ["ffff00", "#ffff0", "#ffff000", "#gggggg", ""] {
            let mut h = highlight();
            h.color = color.into();
            assert!(
                matches!(validate_highlight(&h), Err(ValidationError::InvalidColor(_))),
                "color {color:?} should be rejected"
            );
        }
    }

    #[test]
    fn highlight_rejects_inverted_offsets() {
        let mut h = highlight();
        h.start_offset = 6;
        h.end_offset = 5;
        assert_eq!(
            validate_highlight(&h),
            Err(ValidationError::OffsetOrder { start: 6, end: 5 })
        );
    }

    #[test]
    fn highlight_allows_equal_offsets() {
        let mut h = highlight();
        h.start_offset = 5;
        h.end_offset = 5;
        assert_eq!(validate_highlight(&h), Ok(()));
    }

    #[test]
    fn highlight_rejects_negative_rect() {
        let mut h = highlight();
        h.rect = Rect::new(-1.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            validate_highlight(&h),
            Err(ValidationError::NegativeGeometry { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Bookmark / Comment
    // -----------------------------------------------------------------------

    #[test]
    fn bookmark_requires_title() {
        let mut b = Bookmark::create(
            "u1",
            "d1",
            NewBookmark {
                page_number: 2,
                title: "Intro".into(),
                description: None,
            },
        );
        assert_eq!(validate_bookmark(&b), Ok(()));

        b.title = " \t".into();
        assert!(matches!(
            validate_bookmark(&b),
            Err(ValidationError::EmptyField { field: "title", .. })
        ));
    }

    #[test]
    fn comment_rejects_negative_position() {
        let mut c = Comment::create(
            "u1",
            "d1",
            NewComment {
                page_number: 1,
                content: "note".into(),
                position: Point::new(1.0, 1.0),
            },
        );
        assert_eq!(validate_comment(&c), Ok(()));

        c.position = Point::new(1.0, -0.5);
        assert!(matches!(
            validate_comment(&c),
            Err(ValidationError::NegativeGeometry { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Call-to-action
    // -----------------------------------------------------------------------

    #[test]
    fn valid_cta_passes() {
        assert_eq!(validate_call_to_action(&cta()), Ok(()));
    }

    #[test]
    fn cta_rejects_non_http_urls() {
        for url in ["not-a-url", "ftp://example.com", "https://", "http://"] {
            let mut c = cta();
            c.url = url.into();
            assert!(
                matches!(
                    validate_call_to_action(&c),
                    Err(ValidationError::InvalidUrl(_))
                ),
                "url {url:?} should be rejected"
            );
        }
    }

    #[test]
    fn cta_rejects_zero_area_rect() {
        let mut c = cta();
        c.rect = Rect::new(0.0, 0.0, 0.0, 10.0);
        assert_eq!(validate_call_to_action(&c), Err(ValidationError::EmptyRegion));
    }

    // -----------------------------------------------------------------------
    // Aggregate
    // -----------------------------------------------------------------------

    #[test]
    fn aggregate_accepts_valid_members() {
        let mut set = UserAnnotations::default();
        set.highlights.push(highlight());
        set.call_to_actions.push(cta());
        assert_eq!(validate_user_annotations(&set), Ok(()));
    }

    #[test]
    fn aggregate_rejects_duplicate_ids_within_a_list() {
        let mut set = UserAnnotations::default();
        let h = highlight();
        set.highlights.push(h.clone());
        set.highlights.push(h);
        assert!(matches!(
            validate_user_annotations(&set),
            Err(ValidationError::DuplicateId {
                kind: AnnotationKind::Highlight,
                ..
            })
        ));
    }

    #[test]
    fn aggregate_rejects_invalid_member() {
        let mut set = UserAnnotations::default();
        let mut h = highlight();
        h.color = "yellow".into();
        set.highlights.push(h);
        assert!(validate_user_annotations(&set).is_err());
    }

    #[test]
    fn empty_aggregate_is_valid() {
        assert_eq!(validate_user_annotations(&UserAnnotations::default()), Ok(()));
    }
}
