//! File-to-store synchronization.
//!
//! Reconciles the markdown files of the content directory with the posts
//! held in a [`Store`]:
//!
//! 1. Take one snapshot of the stored posts.
//! 2. Render every source file (sanitized HTML + title).
//! 3. Plan: posts whose filename is no longer on disk are deleted; every
//!    file either updates the snapshot post it matches (by title or by
//!    filename, see [`MatchKey`]) or creates a new post.
//! 4. Apply the plan: deletions first, then upserts in file order.
//!
//! Any render or store failure aborts the pass. A deletion whose row is
//! already gone is not a failure.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::{Post, SourceFile};
use crate::render::Renderer;
use crate::store::Store;

/// Field used to match a rendered file against an existing post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKey {
    /// Match on the derived title. A file whose heading changes gets a new post.
    #[default]
    Title,
    /// Match on the filename. A file whose heading changes keeps its post.
    Filename,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Author written on newly created posts.
    pub author: String,
    pub match_key: MatchKey,
}

/// A source file after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub filename: String,
    pub title: String,
    pub html: String,
}

/// What the upsert pass does with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Create(RenderedFile),
    Update { id: String, file: RenderedFile },
}

/// The full set of store mutations one pass performs.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub deletions: Vec<Post>,
    pub upserts: Vec<Upsert>,
}

impl SyncPlan {
    pub fn creates(&self) -> usize {
        self.upserts
            .iter()
            .filter(|u| matches!(u, Upsert::Create(_)))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.upserts.len() - self.creates()
    }
}

/// Counts reported after a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub files: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Render every file, in order.
pub fn render_files(renderer: &dyn Renderer, files: &[SourceFile]) -> Result<Vec<RenderedFile>> {
    files
        .iter()
        .map(|file| {
            let rendered = renderer
                .render(&file.body)
                .with_context(|| format!("failed to render {}", file.filename))?;
            Ok(RenderedFile {
                filename: file.filename.clone(),
                title: rendered.title_or_default().to_string(),
                html: rendered.html,
            })
        })
        .collect()
}

/// Diff the stored snapshot against the rendered files.
///
/// Posts scheduled for deletion are never chosen as match targets.
pub fn plan(existing: &[Post], files: Vec<RenderedFile>, key: MatchKey) -> SyncPlan {
    let on_disk: HashSet<&str> = files.iter().map(|f| f.filename.as_str()).collect();

    let (survivors, deletions): (Vec<&Post>, Vec<&Post>) = existing
        .iter()
        .partition(|post| on_disk.contains(post.filename.as_str()));

    let upserts = files
        .into_iter()
        .map(|file| {
            let matched = survivors.iter().find(|post| match key {
                MatchKey::Title => post.title == file.title,
                MatchKey::Filename => post.filename == file.filename,
            });
            match matched {
                Some(post) => Upsert::Update {
                    id: post.id.clone(),
                    file,
                },
                None => Upsert::Create(file),
            }
        })
        .collect();

    SyncPlan {
        deletions: deletions.into_iter().cloned().collect(),
        upserts,
    }
}

/// Execute `plan` against `store`.
pub async fn apply(store: &dyn Store, plan: SyncPlan, author: &str) -> Result<SyncReport> {
    let mut report = SyncReport {
        files: plan.upserts.len(),
        ..SyncReport::default()
    };

    for post in &plan.deletions {
        match store
            .delete(&post.id)
            .await
            .with_context(|| format!("failed to delete post {}", post.id))?
        {
            Some(_) => {
                tracing::info!(id = %post.id, filename = %post.filename, "deleted post");
                report.deleted += 1;
            }
            None => {
                tracing::debug!(id = %post.id, "post already removed");
            }
        }
    }

    for upsert in plan.upserts {
        match upsert {
            Upsert::Create(file) => {
                tracing::info!(title = %file.title, filename = %file.filename, "inserting new post");
                let post = Post::new(file.filename, file.title, author, file.html);
                store
                    .create(&post)
                    .await
                    .with_context(|| format!("failed to create post for {}", post.filename))?;
                report.created += 1;
            }
            Upsert::Update { id, file } => {
                tracing::info!(title = %file.title, filename = %file.filename, "updating post content");
                let updated = store
                    .update_post(&id, &file.title, &file.html)
                    .await
                    .with_context(|| format!("failed to update post {}", id))?;
                if updated.is_none() {
                    bail!("post {} disappeared during sync", id);
                }
                report.updated += 1;
            }
        }
    }

    Ok(report)
}

/// Run one full synchronization pass.
pub async fn reconcile(
    store: &dyn Store,
    renderer: &dyn Renderer,
    files: &[SourceFile],
    options: &SyncOptions,
) -> Result<SyncReport> {
    let existing = store.list().await.context("failed to load stored posts")?;
    let rendered = render_files(renderer, files)?;
    let plan = plan(&existing, rendered, options.match_key);
    apply(store, plan, &options.author).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rendered;
    use crate::store::memory::{InMemoryStore, Op};

    /// Takes the first `# ` line as the title and wraps the body in `<p>`.
    struct HeadingRenderer;

    impl Renderer for HeadingRenderer {
        fn render(&self, markdown: &str) -> Result<Rendered> {
            if markdown.contains("BROKEN") {
                bail!("cannot render");
            }
            let title = markdown
                .lines()
                .find_map(|l| l.strip_prefix("# "))
                .map(|t| t.trim().to_string());
            Ok(Rendered {
                html: format!("<p>{}</p>", markdown.trim()),
                title,
            })
        }
    }

    fn file(name: &str, body: &str) -> SourceFile {
        SourceFile {
            filename: name.to_string(),
            body: body.to_string(),
        }
    }

    fn options(key: MatchKey) -> SyncOptions {
        SyncOptions {
            author: "Ada".to_string(),
            match_key: key,
        }
    }

    fn by_filename<'a>(posts: &'a [Post], name: &str) -> Vec<&'a Post> {
        posts.iter().filter(|p| p.filename == name).collect()
    }

    #[tokio::test]
    async fn test_first_pass_creates_posts() {
        let store = InMemoryStore::new();
        let files = vec![file("a.md", "# Alpha\n\nbody"), file("b.md", "no heading")];

        let report = reconcile(&store, &HeadingRenderer, &files, &options(MatchKey::Title))
            .await
            .unwrap();
        assert_eq!(report.created, 2);
        assert_eq!(report.updated, 0);

        let posts = store.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Alpha");
        assert_eq!(posts[1].title, "Untitled");
        assert!(posts.iter().all(|p| p.views == 0 && p.author == "Ada"));
    }

    #[tokio::test]
    async fn test_unchanged_files_keep_identity() {
        let store = InMemoryStore::new();
        let files = vec![file("a.md", "# Alpha\n\nbody")];
        let opts = options(MatchKey::Title);

        reconcile(&store, &HeadingRenderer, &files, &opts).await.unwrap();
        let id = store.posts()[0].id.clone();
        store.increment_views(&id).await.unwrap();
        let before = store.posts()[0].clone();

        let report = reconcile(&store, &HeadingRenderer, &files, &opts).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.created, 0);

        let after = store.posts();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0], before);
    }

    #[tokio::test]
    async fn test_removed_file_is_deleted() {
        let store = InMemoryStore::new();
        let opts = options(MatchKey::Title);
        let files = vec![file("a.md", "# Alpha"), file("b.md", "# Beta")];
        reconcile(&store, &HeadingRenderer, &files, &opts).await.unwrap();

        let report = reconcile(&store, &HeadingRenderer, &files[..1], &opts)
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);

        let posts = store.posts();
        assert!(by_filename(&posts, "b.md").is_empty());
        assert_eq!(by_filename(&posts, "a.md").len(), 1);
    }

    #[tokio::test]
    async fn test_changed_content_replaces_html_only() {
        let store = InMemoryStore::new();
        let opts = options(MatchKey::Title);
        reconcile(&store, &HeadingRenderer, &[file("a.md", "# Alpha\n\nold")], &opts)
            .await
            .unwrap();
        let before = store.posts()[0].clone();

        reconcile(&store, &HeadingRenderer, &[file("a.md", "# Alpha\n\nnew")], &opts)
            .await
            .unwrap();
        let after = store.posts()[0].clone();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.content.contains("new"));
    }

    #[tokio::test]
    async fn test_title_change_under_title_key_creates_new_post() {
        let store = InMemoryStore::new();
        let opts = options(MatchKey::Title);
        reconcile(&store, &HeadingRenderer, &[file("a.md", "# Alpha")], &opts)
            .await
            .unwrap();
        let report = reconcile(&store, &HeadingRenderer, &[file("a.md", "# Renamed")], &opts)
            .await
            .unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(by_filename(&store.posts(), "a.md").len(), 2);
    }

    #[tokio::test]
    async fn test_title_change_under_filename_key_keeps_post() {
        let store = InMemoryStore::new();
        let opts = options(MatchKey::Filename);
        reconcile(&store, &HeadingRenderer, &[file("a.md", "# Alpha")], &opts)
            .await
            .unwrap();
        let id = store.posts()[0].id.clone();

        let report = reconcile(&store, &HeadingRenderer, &[file("a.md", "# Renamed")], &opts)
            .await
            .unwrap();
        assert_eq!(report.updated, 1);

        let posts = store.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, id);
        assert_eq!(posts[0].title, "Renamed");
    }

    #[tokio::test]
    async fn test_renamed_file_with_same_title_is_recreated() {
        let store = InMemoryStore::new();
        let opts = options(MatchKey::Title);
        reconcile(&store, &HeadingRenderer, &[file("old.md", "# Alpha")], &opts)
            .await
            .unwrap();
        let old_id = store.posts()[0].id.clone();

        let report = reconcile(&store, &HeadingRenderer, &[file("new.md", "# Alpha")], &opts)
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.created, 1);

        let posts = store.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].filename, "new.md");
        assert_ne!(posts[0].id, old_id);
    }

    #[tokio::test]
    async fn test_render_failure_aborts_before_mutation() {
        let existing = Post::new("gone.md", "Gone", "Ada", "");
        let store = InMemoryStore::with_posts(vec![existing]);
        let files = vec![file("a.md", "# Alpha"), file("b.md", "BROKEN")];

        let err = reconcile(&store, &HeadingRenderer, &files, &options(MatchKey::Title))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("b.md"));
        assert_eq!(store.posts().len(), 1);
        assert_eq!(store.posts()[0].filename, "gone.md");
    }

    #[tokio::test]
    async fn test_store_failure_aborts() {
        let store = InMemoryStore::new();
        store.fail_on(Op::Create);
        let result = reconcile(
            &store,
            &HeadingRenderer,
            &[file("a.md", "# Alpha")],
            &options(MatchKey::Title),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_matches_pre_sync_snapshot_only() {
        let files = vec![
            RenderedFile {
                filename: "a.md".into(),
                title: "Same".into(),
                html: String::new(),
            },
            RenderedFile {
                filename: "b.md".into(),
                title: "Same".into(),
                html: String::new(),
            },
        ];
        // Neither title is in the snapshot, so both files create.
        let p = plan(&[], files, MatchKey::Title);
        assert_eq!(p.creates(), 2);
        assert_eq!(p.updates(), 0);
        assert!(p.deletions.is_empty());
    }

    #[tokio::test]
    async fn test_apply_tolerates_already_deleted_rows() {
        let ghost = Post::new("ghost.md", "Ghost", "Ada", "");
        let store = InMemoryStore::new();
        let p = SyncPlan {
            deletions: vec![ghost],
            upserts: Vec::new(),
        };
        let report = apply(&store, p, "Ada").await.unwrap();
        assert_eq!(report.deleted, 0);
    }
}
