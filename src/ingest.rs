//! Sync orchestration.
//!
//! Wires the content scanner, the markdown renderer, and a [`Store`] into
//! one pass of [`mdblog_core::sync`]. Used by `mdblog sync` and, before the
//! listener is bound, by `mdblog serve`.

use anyhow::{Context, Result};

use mdblog_core::store::Store;
use mdblog_core::sync::{self, SyncReport};

use crate::config::Config;
use crate::db;
use crate::markdown::MarkdownRenderer;
use crate::migrate;
use crate::source;
use crate::sqlite_store::SqliteStore;

/// Run one synchronization pass against `store`.
pub async fn sync_store(config: &Config, store: &dyn Store) -> Result<SyncReport> {
    let files = source::scan_content(config)?;
    tracing::info!(
        dir = %config.content.dir.display(),
        files = files.len(),
        "synchronizing content directory"
    );

    let report = sync::reconcile(store, &MarkdownRenderer::new(), &files, &config.sync_options())
        .await
        .context("synchronization failed")?;

    tracing::info!(
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        "synchronization complete"
    );
    Ok(report)
}

/// CLI entry point for `mdblog sync`.
pub async fn run_sync(config: &Config, dry_run: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate(&pool).await?;
    let store = SqliteStore::new(pool.clone());

    if dry_run {
        let files = source::scan_content(config)?;
        let existing = store.list().await?;
        let rendered = sync::render_files(&MarkdownRenderer::new(), &files)?;
        let plan = sync::plan(&existing, rendered, config.sync.match_on);

        println!("sync {} (dry-run)", config.content.dir.display());
        println!("  files found: {}", files.len());
        println!("  would create: {}", plan.creates());
        println!("  would update: {}", plan.updates());
        println!("  would delete: {}", plan.deletions.len());
        for post in &plan.deletions {
            println!("    - {} ({})", post.filename, post.title);
        }
        pool.close().await;
        return Ok(());
    }

    let report = sync_store(config, &store).await?;

    println!("sync {}", config.content.dir.display());
    println!("  files: {}", report.files);
    println!("  created: {}", report.created);
    println!("  updated: {}", report.updated);
    println!("  deleted: {}", report.deleted);
    println!("ok");

    pool.close().await;
    Ok(())
}
