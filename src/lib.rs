//! # mdblog
//!
//! A blog served from a directory of markdown files.
//!
//! Every file in the content directory becomes one post in a SQLite
//! `posts` table. On each sync the files are rendered to sanitized HTML,
//! titled by their first level-1 heading, and reconciled against the table:
//! new titles are created, known titles have their content replaced, and
//! posts whose file is gone are deleted. The HTTP server syncs once at
//! startup and then serves the list, single-article, and title-search
//! pages through minijinja templates.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────┐
//! │ markdown/  │──▶│ render+sync  │──▶│  SQLite  │
//! │  *.md      │   │ (mdblog-core)│   │  posts   │
//! └────────────┘   └──────────────┘   └────┬─────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │ (mdblog) │       │  (axum)  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mdblog init                  # create database
//! mdblog sync                  # load ./markdown into the posts table
//! mdblog search "rust"         # title search
//! mdblog serve                 # sync, then serve on 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite implementation of the post store |
//! | [`markdown`] | Markdown to sanitized HTML |
//! | [`source`] | Content directory scanner |
//! | [`ingest`] | Sync orchestration |
//! | [`templates`] | Server-side templates |
//! | [`server`] | HTTP server |
//! | [`posts`] | `list` / `get` / `search` commands |

pub mod config;
pub mod db;
pub mod ingest;
pub mod markdown;
pub mod migrate;
pub mod posts;
pub mod server;
pub mod source;
pub mod sqlite_store;
pub mod templates;

pub use mdblog_core;
