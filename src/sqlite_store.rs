//! SQLite-backed [`Store`] implementation.
//!
//! Every [`Store`] method is exactly one statement against the `posts`
//! table created by [`crate::migrate`].

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use mdblog_core::models::Post;
use mdblog_core::store::Store;

const COLUMNS: &str = "id, filename, title, author, content, views, created_at";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_post(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        filename: row.get("filename"),
        title: row.get("title"),
        author: row.get("author"),
        content: row.get("content"),
        views: row.get("views"),
        created_at: row.get("created_at"),
    }
}

/// Escape `LIKE` wildcards so `text` matches literally, then wrap in `%`.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl Store for SqliteStore {
    async fn create(&self, post: &Post) -> Result<Post> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO posts (id, filename, title, title_folded, author, content, views, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&post.id)
        .bind(&post.filename)
        .bind(&post.title)
        .bind(post.title.to_lowercase())
        .bind(&post.author)
        .bind(&post.content)
        .bind(post.views)
        .bind(&post.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row_to_post(&row))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM posts"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_post).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn increment_views(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET views = views + 1 WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn update_post(&self, id: &str, title: &str, content: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET title = ?, title_folded = ?, content = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(title)
        .bind(title.to_lowercase())
        .bind(content)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn delete(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("DELETE FROM posts WHERE id = ? RETURNING {COLUMNS}"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_post))
    }

    async fn search_titles(&self, text: &str) -> Result<Vec<Post>> {
        // Both sides are folded in Rust; SQLite's LIKE only folds ASCII.
        let rows = sqlx::query(&format!(
            r"SELECT {COLUMNS} FROM posts WHERE title_folded LIKE ? ESCAPE '\'"
        ))
        .bind(like_pattern(&text.to_lowercase()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_post).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::migrate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        migrate(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern("a_b"), r"%a\_b%");
        assert_eq!(like_pattern(r"c:\"), r"%c:\\%");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = memory_store().await;
        let post = Post::new("a.md", "Alpha", "Ada", "<p>a</p>");
        let created = store.create(&post).await.unwrap();
        assert_eq!(created, post);
        assert_eq!(store.get(&post.id).await.unwrap(), Some(post));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_an_error() {
        let store = memory_store().await;
        let post = Post::new("a.md", "Alpha", "Ada", "");
        store.create(&post).await.unwrap();
        assert!(store.create(&post).await.is_err());
    }

    #[tokio::test]
    async fn test_increment_views() {
        let store = memory_store().await;
        let post = Post::new("a.md", "Alpha", "Ada", "");
        store.create(&post).await.unwrap();

        store.increment_views(&post.id).await.unwrap();
        let bumped = store.increment_views(&post.id).await.unwrap().unwrap();
        assert_eq!(bumped.views, 2);
        assert!(store.increment_views("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_post_keeps_other_columns() {
        let store = memory_store().await;
        let post = Post::new("a.md", "Alpha", "Ada", "<p>old</p>");
        store.create(&post).await.unwrap();
        store.increment_views(&post.id).await.unwrap();

        let updated = store
            .update_post(&post.id, "Alpha", "<p>new</p>")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.content, "<p>new</p>");
        assert_eq!(updated.views, 1);
        assert_eq!(updated.created_at, post.created_at);
        assert_eq!(updated.author, "Ada");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = memory_store().await;
        let post = Post::new("a.md", "Alpha", "Ada", "");
        store.create(&post).await.unwrap();

        let deleted = store.delete(&post.id).await.unwrap();
        assert_eq!(deleted.map(|p| p.id), Some(post.id.clone()));
        assert!(store.delete(&post.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_titles() {
        let store = memory_store().await;
        for (file, title) in [
            ("a.md", "Hello World"),
            ("b.md", "Say hello"),
            ("c.md", "50% off"),
            ("d.md", "Unrelated"),
        ] {
            store.create(&Post::new(file, title, "Ada", "")).await.unwrap();
        }

        assert_eq!(store.search_titles("HELLO").await.unwrap().len(), 2);
        assert_eq!(store.search_titles("%").await.unwrap().len(), 1);
        assert_eq!(store.search_titles("_").await.unwrap().len(), 0);
        assert!(store.search_titles("nothing here").await.unwrap().is_empty());
        assert_eq!(store.search_titles("").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_titles_folds_non_ascii_case() {
        let store = memory_store().await;
        let elan = Post::new("e.md", "Élan vital", "Ada", "");
        store.create(&elan).await.unwrap();
        store
            .create(&Post::new("u.md", "Über Rust", "Ada", ""))
            .await
            .unwrap();

        let found = store.search_titles("élan").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Élan vital");
        assert_eq!(store.search_titles("ÜBER").await.unwrap().len(), 1);

        store
            .update_post(&elan.id, "Ωmega", "")
            .await
            .unwrap()
            .unwrap();
        assert!(store.search_titles("élan").await.unwrap().is_empty());
        assert_eq!(store.search_titles("ωMEGA").await.unwrap().len(), 1);
    }
}
