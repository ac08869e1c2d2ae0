//! TOML configuration parsing and validation.
//!
//! The database URL may be overridden by the `DATABASE_URL` environment
//! variable (a `.env` file is loaded by `main` before config is read).

use anyhow::{Context, Result};
use mdblog_core::sync::{MatchKey, SyncOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[db].url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub blog: BlogConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            include_globs: default_include_globs(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("./markdown")
}

fn default_include_globs() -> Vec<String> {
    vec!["*.md".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlogConfig {
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
        }
    }
}

fn default_author() -> String {
    "Anonymous".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub match_on: MatchKey,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_views")]
    pub views: PathBuf,
    #[serde(default = "default_public")]
    pub public: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            views: default_views(),
            public: default_public(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_views() -> PathBuf {
    PathBuf::from("./views")
}
fn default_public() -> PathBuf {
    PathBuf::from("./public")
}

impl Config {
    /// Config used when no file is present: every section at its default,
    /// database under `./data`.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                url: "sqlite:./data/mdblog.sqlite".to_string(),
                max_connections: default_max_connections(),
            },
            content: ContentConfig::default(),
            blog: BlogConfig::default(),
            sync: SyncConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            author: self.blog.author.clone(),
            match_key: self.sync.match_on,
        }
    }

    /// Replace `[db].url` with `$DATABASE_URL` when it is set and non-empty.
    pub fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.db.url = url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.db.url.trim().is_empty() {
            anyhow::bail!("db.url must not be empty");
        }
        if self.db.max_connections == 0 {
            anyhow::bail!("db.max_connections must be >= 1");
        }
        if self.blog.author.trim().is_empty() {
            anyhow::bail!("blog.author must not be empty");
        }
        if self.server.bind.trim().is_empty() {
            anyhow::bail!("server.bind must not be empty");
        }
        if self.content.include_globs.is_empty() {
            anyhow::bail!("content.include_globs must list at least one pattern");
        }
        Ok(())
    }
}

/// Read, parse, env-override, and validate the config at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)?.apply_env();
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but falls back to [`Config::minimal`] when the
/// file does not exist.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    tracing::warn!(path = %path.display(), "config file not found, using defaults");
    let config = Config::minimal().apply_env();
    config.validate()?;
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}
