//! Core data models shared by the store, synchronizer, and handlers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A persisted blog post derived from one markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// UUID v4, assigned once at creation.
    pub id: String,
    /// Name of the backing source file; deletion key during sync.
    pub filename: String,
    /// Text of the first level-1 heading, or [`crate::render::UNTITLED`].
    pub title: String,
    pub author: String,
    /// Sanitized HTML.
    pub content: String,
    pub views: i64,
    /// RFC 3339, immutable after creation.
    pub created_at: String,
}

impl Post {
    /// Build a fresh post with a new id, zero views, and the current time.
    pub fn new(
        filename: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename: filename.into(),
            title: title.into(),
            author: author.into(),
            content: content.into(),
            views: 0,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Parse `created_at`, if it is a valid RFC 3339 timestamp.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// `created_at` formatted for display (e.g. `March 4, 2024`).
    ///
    /// Falls back to the raw string when it does not parse.
    pub fn display_date(&self) -> String {
        self.created()
            .map(|dt| dt.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.created_at.clone())
    }
}

/// One markdown file read from the content directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: String,
    pub body: String,
}
