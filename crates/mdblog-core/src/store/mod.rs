//! Storage abstraction for mdblog.
//!
//! The [`Store`] trait is the capability interface every backend
//! implements and every caller (synchronizer, request handlers, HTTP
//! adapter) goes through. Each method maps to exactly one statement
//! against the backing table; no method spans a transaction, and no
//! method retries.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Post;

/// Abstract storage backend for posts.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`create`](Store::create) | Insert a new post |
/// | [`list`](Store::list) | All posts, in storage order |
/// | [`get`](Store::get) | One post by id |
/// | [`increment_views`](Store::increment_views) | `views = views + 1` |
/// | [`update_post`](Store::update_post) | Replace title and content |
/// | [`delete`](Store::delete) | Remove one post |
/// | [`search_titles`](Store::search_titles) | Case-insensitive title substring match |
///
/// Methods addressing a single id return `Ok(None)` when no row matched.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert `post` and return the stored row.
    async fn create(&self, post: &Post) -> Result<Post>;

    async fn list(&self) -> Result<Vec<Post>>;

    async fn get(&self, id: &str) -> Result<Option<Post>>;

    /// Add one to the post's view count and return the updated row.
    async fn increment_views(&self, id: &str) -> Result<Option<Post>>;

    /// Overwrite title and content, leaving every other column untouched.
    async fn update_post(&self, id: &str, title: &str, content: &str) -> Result<Option<Post>>;

    /// Remove the post and return the deleted row.
    async fn delete(&self, id: &str) -> Result<Option<Post>>;

    /// Posts whose title contains `text`, ignoring case.
    ///
    /// `text` is matched literally; wildcard characters carry no meaning.
    async fn search_titles(&self, text: &str) -> Result<Vec<Post>>;
}
