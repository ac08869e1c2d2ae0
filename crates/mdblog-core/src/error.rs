//! Error type returned by the request-handler service.

use thiserror::Error;

/// Failure of a [`Blog`](crate::service::Blog) operation.
///
/// Store failures are carried through unchanged; the only other case the
/// handlers distinguish is a missing post.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("post not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl BlogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound(_))
    }
}
