//! Markdown renderer contract.
//!
//! Defines the [`Renderer`] trait the synchronizer renders through. The
//! concrete pulldown-cmark + syntect + ammonia implementation lives in the
//! `mdblog` app crate.

use anyhow::Result;

/// Title used when a document has no level-1 heading.
pub const UNTITLED: &str = "Untitled";

/// Output of a single render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Sanitized HTML.
    pub html: String,
    /// Text of the first level-1 heading, if any.
    pub title: Option<String>,
}

impl Rendered {
    /// The extracted title, or [`UNTITLED`].
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

/// Converts markdown into sanitized HTML and reports the document title.
///
/// Each call is independent: the title is returned with the HTML, never
/// carried between calls.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<Rendered>;
}
