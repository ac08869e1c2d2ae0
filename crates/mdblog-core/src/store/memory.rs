//! In-memory [`Store`] implementation for tests.
//!
//! Keeps posts in insertion order in a `Vec` behind `std::sync::RwLock`.
//! A failure switch lets tests make individual operations error out.

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::Post;

use super::Store;

/// Store operations that can be made to fail via [`InMemoryStore::fail_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    List,
    Get,
    IncrementViews,
    UpdatePost,
    Delete,
    SearchTitles,
}

/// In-memory store for tests.
pub struct InMemoryStore {
    posts: RwLock<Vec<Post>>,
    failing: RwLock<HashSet<Op>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Build a store pre-populated with `posts`.
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// Make every subsequent call of `op` return an error.
    pub fn fail_on(&self, op: Op) {
        self.failing.write().unwrap().insert(op);
    }

    /// Snapshot of all stored posts.
    pub fn posts(&self) -> Vec<Post> {
        self.posts.read().unwrap().clone()
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.failing.read().unwrap().contains(&op) {
            bail!("in-memory store: {:?} failed", op);
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create(&self, post: &Post) -> Result<Post> {
        self.check(Op::Create)?;
        let mut posts = self.posts.write().unwrap();
        if posts.iter().any(|p| p.id == post.id) {
            bail!("duplicate post id: {}", post.id);
        }
        posts.push(post.clone());
        Ok(post.clone())
    }

    async fn list(&self) -> Result<Vec<Post>> {
        self.check(Op::List)?;
        Ok(self.posts())
    }

    async fn get(&self, id: &str) -> Result<Option<Post>> {
        self.check(Op::Get)?;
        let posts = self.posts.read().unwrap();
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn increment_views(&self, id: &str) -> Result<Option<Post>> {
        self.check(Op::IncrementViews)?;
        let mut posts = self.posts.write().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.views += 1;
            p.clone()
        }))
    }

    async fn update_post(&self, id: &str, title: &str, content: &str) -> Result<Option<Post>> {
        self.check(Op::UpdatePost)?;
        let mut posts = self.posts.write().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.title = title.to_string();
            p.content = content.to_string();
            p.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<Option<Post>> {
        self.check(Op::Delete)?;
        let mut posts = self.posts.write().unwrap();
        let pos = posts.iter().position(|p| p.id == id);
        Ok(pos.map(|i| posts.remove(i)))
    }

    async fn search_titles(&self, text: &str) -> Result<Vec<Post>> {
        self.check(Op::SearchTitles)?;
        let needle = text.to_lowercase();
        let posts = self.posts.read().unwrap();
        Ok(posts
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
