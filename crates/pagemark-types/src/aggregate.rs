use serde::{Deserialize, Serialize};

use crate::annotation::{Bookmark, CallToAction, Comment, Highlight};
use crate::counts::AnnotationCounts;

/// The full annotation set for one (user, document) pair.
///
/// This is the unit of read/write in the storage substrate: every save
/// rewrites the whole aggregate. Lists preserve insertion order, and each
/// member is owned by exactly one aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnnotations {
    pub highlights: Vec<Highlight>,
    pub bookmarks: Vec<Bookmark>,
    pub comments: Vec<Comment>,
    pub call_to_actions: Vec<CallToAction>,
}

impl UserAnnotations {
    /// Returns `true` if all four lists are empty.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
            && self.bookmarks.is_empty()
            && self.comments.is_empty()
            && self.call_to_actions.is_empty()
    }

    /// Per-kind counts for this aggregate.
    pub fn counts(&self) -> AnnotationCounts {
        AnnotationCounts {
            highlights: self.highlights.len(),
            bookmarks: self.bookmarks.len(),
            comments: self.comments.len(),
            call_to_actions: self.call_to_actions.len(),
        }
    }

    /// The aggregate restricted to a single page, preserving list order.
    pub fn for_page(&self, page_number: u32) -> UserAnnotations {
        UserAnnotations {
            highlights: self
                .highlights
                .iter()
                .filter(|h| h.page_number == page_number)
                .cloned()
                .collect(),
            bookmarks: self
                .bookmarks
                .iter()
                .filter(|b| b.page_number == page_number)
                .cloned()
                .collect(),
            comments: self
                .comments
                .iter()
                .filter(|c| c.page_number == page_number)
                .cloned()
                .collect(),
            call_to_actions: self
                .call_to_actions
                .iter()
                .filter(|c| c.page_number == page_number)
                .cloned()
                .collect(),
        }
    }

    /// Rewrite the owner of every member annotation.
    ///
    /// Used by migration when transplanting an aggregate across identities;
    /// document IDs are never changed.
    pub fn set_user_id(&mut self, user_id: &str) {
        for highlight in &mut self.highlights {
            highlight.user_id = user_id.to_owned();
        }
        for bookmark in &mut self.bookmarks {
            bookmark.user_id = user_id.to_owned();
        }
        for comment in &mut self.comments {
            comment.user_id = user_id.to_owned();
        }
        for cta in &mut self.call_to_actions {
            cta.user_id = user_id.to_owned();
        }
    }
}
