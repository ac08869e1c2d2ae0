//! Server-side templates.
//!
//! Every file under the views directory is compiled once at startup into a
//! minijinja [`Environment`], named by its path relative to that directory
//! with `/` separators (`index.html`, `partials/articles.html`). Partials
//! are pulled in with `{% include %}`. Files ending in `.html` are
//! auto-escaped; post content is already sanitized and is emitted with
//! `|safe`.

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile every template file under `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut env = Environment::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("Failed to read views directory {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = path
                .strip_prefix(dir)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;

            env.add_template_owned(name.clone(), source)
                .with_context(|| format!("Failed to compile template {}", name))?;
            tracing::debug!(template = %name, "loaded template");
        }

        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .with_context(|| format!("Unknown template {}", name))?;
        template
            .render(ctx)
            .with_context(|| format!("Failed to render template {}", name))
    }
}
