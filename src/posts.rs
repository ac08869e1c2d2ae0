//! Post inspection commands.
//!
//! `mdblog list`, `mdblog get <id>`, and `mdblog search <text>` go through
//! the same [`Blog`] service as the HTTP handlers, so `get` counts a view
//! exactly like `GET /articles/{id}`.

use anyhow::Result;
use std::sync::Arc;

use mdblog_core::models::Post;
use mdblog_core::Blog;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

async fn open_blog(config: &Config) -> Result<(Blog, sqlx::SqlitePool)> {
    let pool = db::connect(config).await?;
    migrate::migrate(&pool).await?;
    let blog = Blog::new(Arc::new(SqliteStore::new(pool.clone())));
    Ok((blog, pool))
}

/// CLI entry point for `mdblog list`.
pub async fn run_list(config: &Config) -> Result<()> {
    let (blog, pool) = open_blog(config).await?;
    let posts = blog.popular_posts().await?;
    pool.close().await;

    print_table(&posts);
    Ok(())
}

/// CLI entry point for `mdblog get`.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let (blog, pool) = open_blog(config).await?;
    let result = blog.get_post(id).await;
    pool.close().await;
    let post = result?;

    println!("--- Post ---");
    println!("id:         {}", post.id);
    println!("title:      {}", post.title);
    println!("filename:   {}", post.filename);
    println!("author:     {}", post.author);
    println!("created_at: {}", post.created_at);
    println!("views:      {}", post.views);
    println!();
    println!("--- Content ---");
    println!("{}", post.content);

    Ok(())
}

/// CLI entry point for `mdblog search`.
pub async fn run_search(config: &Config, text: &str) -> Result<()> {
    let (blog, pool) = open_blog(config).await?;
    let posts = blog.search_posts(text).await?;
    pool.close().await;

    print_table(&posts);
    Ok(())
}

fn print_table(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts.");
        return;
    }

    println!("{:<36}  {:>6}  {:<20}  TITLE", "ID", "VIEWS", "DATE");
    for post in posts {
        println!(
            "{:<36}  {:>6}  {:<20}  {}",
            post.id,
            post.views,
            post.display_date(),
            post.title
        );
    }
    println!();
    println!("{} post(s)", posts.len());
}
