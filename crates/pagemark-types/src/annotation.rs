use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Generate a fresh annotation identifier.
///
/// UUID v7: timestamp-ordered with 74 bits of randomness. Collision-resistant
/// enough for multi-writer use, unlike a bare timestamp-plus-suffix scheme.
pub fn new_annotation_id() -> String {
    Uuid::now_v7().to_string()
}

/// A text highlight on a document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub page_number: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    pub selected_text: String,
    /// Hex color in `#RRGGBB` form.
    pub color: String,
    pub rect: Rect,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input fields for creating a [`Highlight`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewHighlight {
    pub page_number: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    pub selected_text: String,
    pub color: String,
    pub rect: Rect,
}

/// Partial update for a [`Highlight`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightPatch {
    pub page_number: Option<u32>,
    pub start_offset: Option<u32>,
    pub end_offset: Option<u32>,
    pub selected_text: Option<String>,
    pub color: Option<String>,
    pub rect: Option<Rect>,
}

impl Highlight {
    /// Construct a new highlight with a fresh ID and current timestamps.
    pub fn create(
        user_id: impl Into<String>,
        document_id: impl Into<String>,
        input: NewHighlight,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_annotation_id(),
            user_id: user_id.into(),
            document_id: document_id.into(),
            page_number: input.page_number,
            start_offset: input.start_offset,
            end_offset: input.end_offset,
            selected_text: input.selected_text,
            color: input.color,
            rect: input.rect,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place and refresh `updated_at`.
    pub fn apply(&mut self, patch: HighlightPatch) {
        if let Some(page_number) = patch.page_number {
            self.page_number = page_number;
        }
        if let Some(start_offset) = patch.start_offset {
            self.start_offset = start_offset;
        }
        if let Some(end_offset) = patch.end_offset {
            self.end_offset = end_offset;
        }
        if let Some(selected_text) = patch.selected_text {
            self.selected_text = selected_text;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(rect) = patch.rect {
            self.rect = rect;
        }
        self.updated_at = Utc::now();
    }
}

/// A named bookmark for a document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub page_number: u32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input fields for creating a [`Bookmark`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark {
    pub page_number: u32,
    pub title: String,
    pub description: Option<String>,
}

/// Partial update for a [`Bookmark`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkPatch {
    pub page_number: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Bookmark {
    /// Construct a new bookmark with a fresh ID and current timestamps.
    pub fn create(
        user_id: impl Into<String>,
        document_id: impl Into<String>,
        input: NewBookmark,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_annotation_id(),
            user_id: user_id.into(),
            document_id: document_id.into(),
            page_number: input.page_number,
            title: input.title,
            description: input.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place and refresh `updated_at`.
    pub fn apply(&mut self, patch: BookmarkPatch) {
        if let Some(page_number) = patch.page_number {
            self.page_number = page_number;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }
}

/// A point-anchored comment on a document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub page_number: u32,
    pub content: String,
    pub position: Point,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input fields for creating a [`Comment`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub page_number: u32,
    pub content: String,
    pub position: Point,
}

/// Partial update for a [`Comment`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentPatch {
    pub page_number: Option<u32>,
    pub content: Option<String>,
    pub position: Option<Point>,
}

impl Comment {
    /// Construct a new comment with a fresh ID and current timestamps.
    pub fn create(
        user_id: impl Into<String>,
        document_id: impl Into<String>,
        input: NewComment,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_annotation_id(),
            user_id: user_id.into(),
            document_id: document_id.into(),
            page_number: input.page_number,
            content: input.content,
            position: input.position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place and refresh `updated_at`.
    pub fn apply(&mut self, patch: CommentPatch) {
        if let Some(page_number) = patch.page_number {
            self.page_number = page_number;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        self.updated_at = Utc::now();
    }
}

/// A clickable call-to-action region linking to an external URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToAction {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub page_number: u32,
    pub url: String,
    pub label: String,
    pub rect: Rect,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input fields for creating a [`CallToAction`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCallToAction {
    pub page_number: u32,
    pub url: String,
    pub label: String,
    pub rect: Rect,
}

/// Partial update for a [`CallToAction`]. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallToActionPatch {
    pub page_number: Option<u32>,
    pub url: Option<String>,
    pub label: Option<String>,
    pub rect: Option<Rect>,
}

impl CallToAction {
    /// Construct a new call-to-action with a fresh ID and current timestamps.
    pub fn create(
        user_id: impl Into<String>,
        document_id: impl Into<String>,
        input: NewCallToAction,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_annotation_id(),
            user_id: user_id.into(),
            document_id: document_id.into(),
            page_number: input.page_number,
            url: input.url,
            label: input.label,
            rect: input.rect,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place and refresh `updated_at`.
    pub fn apply(&mut self, patch: CallToActionPatch) {
        if let Some(page_number) = patch.page_number {
            self.page_number = page_number;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(rect) = patch.rect {
            self.rect = rect;
        }
        self.updated_at = Utc::now();
    }
}
