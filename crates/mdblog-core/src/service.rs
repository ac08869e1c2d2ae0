//! Request handlers.
//!
//! [`Blog`] is the one entry point HTTP adapters and the CLI use. Every
//! method forwards to a single [`Store`] operation and passes failures
//! through unchanged; [`Blog::get_post`] additionally bumps the view count.

use std::sync::Arc;

use crate::error::BlogError;
use crate::models::Post;
use crate::store::Store;

pub type BlogResult<T> = Result<T, BlogError>;

#[derive(Clone)]
pub struct Blog {
    store: Arc<dyn Store>,
}

impl Blog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn list_posts(&self) -> BlogResult<Vec<Post>> {
        Ok(self.store.list().await?)
    }

    /// All posts, most viewed first. Ties keep storage order.
    pub async fn popular_posts(&self) -> BlogResult<Vec<Post>> {
        let mut posts = self.list_posts().await?;
        posts.sort_by(|a, b| b.views.cmp(&a.views));
        Ok(posts)
    }

    /// Fetch a post and count the view.
    ///
    /// Returns the post as it was before the increment. If the increment
    /// fails the whole call fails, even though the fetch succeeded.
    pub async fn get_post(&self, id: &str) -> BlogResult<Post> {
        let post = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| BlogError::NotFound(id.to_string()))?;

        self.store
            .increment_views(id)
            .await?
            .ok_or_else(|| BlogError::NotFound(id.to_string()))?;

        Ok(post)
    }

    pub async fn create_post(&self, post: &Post) -> BlogResult<Post> {
        Ok(self.store.create(post).await?)
    }

    pub async fn update_post(&self, id: &str, title: &str, content: &str) -> BlogResult<Post> {
        self.store
            .update_post(id, title, content)
            .await?
            .ok_or_else(|| BlogError::NotFound(id.to_string()))
    }

    pub async fn delete_post(&self, id: &str) -> BlogResult<Post> {
        self.store
            .delete(id)
            .await?
            .ok_or_else(|| BlogError::NotFound(id.to_string()))
    }

    pub async fn search_posts(&self, text: &str) -> BlogResult<Vec<Post>> {
        Ok(self.store.search_titles(text).await?)
    }
}
