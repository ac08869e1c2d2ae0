//! Content directory scanner.
//!
//! Lists the markdown files directly inside `[content].dir` (no recursion)
//! that match `include_globs`, and reads each one. Any unreadable file is
//! an error; the sync pass must not proceed on a partial listing.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::Config;
use mdblog_core::models::SourceFile;

pub fn scan_content(config: &Config) -> Result<Vec<SourceFile>> {
    scan_dir(&config.content.dir, &config.content.include_globs)
}

pub fn scan_dir(root: &Path, include_globs: &[String]) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        bail!("Content directory does not exist: {}", root.display());
    }

    let include_set = build_globset(include_globs)?;
    let mut files = Vec::new();

    let walker = WalkDir::new(root).min_depth(1).max_depth(1);
    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to list content directory {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        if !include_set.is_match(&filename) {
            continue;
        }

        let body = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.push(SourceFile { filename, body });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
