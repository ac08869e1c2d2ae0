//! # mdblog CLI (`mdblog`)
//!
//! The `mdblog` binary syncs a directory of markdown files into SQLite and
//! serves them as a blog.
//!
//! ## Usage
//!
//! ```bash
//! mdblog --config ./config/mdblog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mdblog init` | Create the SQLite database and the `posts` table |
//! | `mdblog sync` | Reconcile the `posts` table with the content directory |
//! | `mdblog serve` | Sync, then start the HTTP server |
//! | `mdblog list` | Print all posts, most viewed first |
//! | `mdblog get <id>` | Print one post (counts a view) |
//! | `mdblog search "<text>"` | Print posts whose title contains `<text>` |
//!
//! ## Examples
//!
//! ```bash
//! # Preview what a sync would change
//! mdblog sync --dry-run
//!
//! # Serve on the configured address with request logging
//! RUST_LOG=info,tower_http=debug mdblog serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mdblog::{config, ingest, migrate, posts, server};

/// mdblog: a markdown-backed blog.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A `.env` file in the working directory is loaded first, so
/// `DATABASE_URL` can be set there.
#[derive(Parser)]
#[command(
    name = "mdblog",
    about = "mdblog: serve a directory of markdown files as a blog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mdblog.toml`. When the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/mdblog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `posts` table. Safe to run
    /// more than once.
    Init,

    /// Run one synchronization pass.
    ///
    /// Renders every markdown file in the content directory, then creates,
    /// updates, and deletes posts so the table matches the directory.
    Sync {
        /// Show what would change without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Sync, then start the HTTP server.
    ///
    /// The listener is not bound if the sync fails.
    Serve,

    /// List all posts, most viewed first.
    List,

    /// Print one post by id. Counts as a view.
    Get {
        /// Post UUID.
        id: String,
    },

    /// Search post titles (case-insensitive substring).
    Search {
        /// Text to look for.
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync { dry_run } => {
            ingest::run_sync(&cfg, dry_run).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List => {
            posts::run_list(&cfg).await?;
        }
        Commands::Get { id } => {
            posts::run_get(&cfg, &id).await?;
        }
        Commands::Search { text } => {
            posts::run_search(&cfg, &text).await?;
        }
    }

    Ok(())
}
