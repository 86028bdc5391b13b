use std::fmt;

use serde::{Deserialize, Serialize};

/// The four annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnnotationKind {
    Highlight,
    Bookmark,
    Comment,
    CallToAction,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Bookmark => "bookmark",
            AnnotationKind::Comment => "comment",
            AnnotationKind::CallToAction => "call-to-action",
        };
        f.write_str(name)
    }
}

/// Per-kind annotation counts, used for reporting by the manager and the
/// migration engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationCounts {
    pub highlights: usize,
    pub bookmarks: usize,
    pub comments: usize,
    pub call_to_actions: usize,
}

impl AnnotationCounts {
    /// Sum across all four kinds.
    pub fn total(&self) -> usize {
        self.highlights + self.bookmarks + self.comments + self.call_to_actions
    }

    /// Count for a single kind.
    pub fn get(&self, kind: AnnotationKind) -> usize {
        match kind {
            AnnotationKind::Highlight => self.highlights,
            AnnotationKind::Bookmark => self.bookmarks,
            AnnotationKind::Comment => self.comments,
            AnnotationKind::CallToAction => self.call_to_actions,
        }
    }

    /// Increment the count for a single kind.
    pub fn add(&mut self, kind: AnnotationKind, n: usize) {
        match kind {
            AnnotationKind::Highlight => self.highlights += n,
            AnnotationKind::Bookmark => self.bookmarks += n,
            AnnotationKind::Comment => self.comments += n,
            AnnotationKind::CallToAction => self.call_to_actions += n,
        }
    }

    /// Accumulate another set of counts into this one.
    pub fn merge(&mut self, other: &AnnotationCounts) {
        self.highlights += other.highlights;
        self.bookmarks += other.bookmarks;
        self.comments += other.comments;
        self.call_to_actions += other.call_to_actions;
    }
}
