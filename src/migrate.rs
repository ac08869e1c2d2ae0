//! Schema migrations.
//!
//! Creates the `posts` table and its index. `title_folded` holds the title
//! lowercased with full Unicode case folding, which SQLite's own `LOWER`
//! and `LIKE` do not provide; title search matches against it. Tables
//! created before that column existed get it added and backfilled.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

/// Create the `posts` table and its index on an open pool. Idempotent.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            title TEXT NOT NULL,
            title_folded TEXT NOT NULL DEFAULT '',
            author TEXT NOT NULL,
            content TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_id ON posts(id)")
        .execute(pool)
        .await?;

    add_title_folded(pool).await?;

    Ok(())
}

async fn add_title_folded(pool: &SqlitePool) -> Result<()> {
    let present: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('posts') WHERE name = 'title_folded'",
    )
    .fetch_one(pool)
    .await?;
    if present > 0 {
        return Ok(());
    }

    sqlx::query("ALTER TABLE posts ADD COLUMN title_folded TEXT NOT NULL DEFAULT ''")
        .execute(pool)
        .await?;

    let rows = sqlx::query("SELECT id, title FROM posts")
        .fetch_all(pool)
        .await?;
    for row in &rows {
        let id: String = row.get("id");
        let title: String = row.get("title");
        sqlx::query("UPDATE posts SET title_folded = ? WHERE id = ?")
            .bind(title.to_lowercase())
            .bind(id)
            .execute(pool)
            .await?;
    }
    tracing::info!(posts = rows.len(), "added title_folded column");

    Ok(())
}

/// Open the configured database, apply the schema, and close it.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate(&pool).await?;
    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_migrate_backfills_title_folded() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE posts (id TEXT PRIMARY KEY, filename TEXT NOT NULL, \
             title TEXT NOT NULL, author TEXT NOT NULL, content TEXT NOT NULL, \
             views INTEGER NOT NULL DEFAULT 0, created_at TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO posts VALUES ('1', 'a.md', 'Über Rust', 'Ada', '', 0, 'now')")
            .execute(&pool)
            .await
            .unwrap();

        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();

        let folded: String = sqlx::query_scalar("SELECT title_folded FROM posts WHERE id = '1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(folded, "über rust");
    }
}
