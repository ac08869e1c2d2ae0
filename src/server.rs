//! HTTP server.
//!
//! Serves the blog through server-side templates. Startup order is fixed:
//! open the pool, migrate, run one synchronization pass, load templates,
//! and only then bind the listener. A failed sync never reaches `bind`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | All posts, most viewed first (`index.html`) |
//! | `GET`  | `/articles/{id}` | One post, counts a view (`article.html`) |
//! | `POST` | `/search` | Form field `search`; title matches (`partials/articles.html`) |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/public/*` | Static files from `[server].public` |
//!
//! Unknown article ids answer `404`; store and template failures answer `500`.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use mdblog_core::{Blog, BlogError};

use crate::config::Config;
use crate::db;
use crate::ingest;
use crate::migrate;
use crate::sqlite_store::SqliteStore;
use crate::templates::Templates;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    blog: Blog,
    templates: Arc<Templates>,
}

impl AppState {
    pub fn new(blog: Blog, templates: Templates) -> Self {
        Self {
            blog,
            templates: Arc::new(templates),
        }
    }
}

/// Starts the blog server.
///
/// Returns an error without binding if the database cannot be opened, the
/// synchronization pass fails, or the templates do not load.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate(&pool).await?;
    let store = Arc::new(SqliteStore::new(pool));

    ingest::sync_store(config, store.as_ref()).await?;

    let templates = Templates::load(&config.server.views)?;
    let state = AppState::new(Blog::new(store), templates);
    let app = router(state, config);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "blog listening");
    println!("Blog listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/articles/{id}", get(handle_article))
        .route("/search", post(handle_search))
        .route("/health", get(handle_health))
        .nest_service("/public", ServeDir::new(&config.server.public))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<BlogError> for AppError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::NotFound(id) => AppError {
                status: StatusCode::NOT_FOUND,
                message: format!("no article with id {}", id),
            },
            BlogError::Store(e) => {
                tracing::error!(error = %format!("{:#}", e), "store error");
                internal()
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{:#}", err), "request failed");
        internal()
    }
}

fn internal() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "internal server error".to_string(),
    }
}

// ============ GET / ============

async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let articles = state.blog.popular_posts().await?;
    let html = state
        .templates
        .render("index.html", context! { articles => articles })?;
    Ok(Html(html))
}

// ============ GET /articles/{id} ============

async fn handle_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let article = state.blog.get_post(&id).await?;
    let date = article.display_date();
    let html = state.templates.render(
        "article.html",
        context! {
            title => &article.title,
            views => article.views,
            author => &article.author,
            date => date,
            content => &article.content,
        },
    )?;
    Ok(Html(html))
}

// ============ POST /search ============

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    search: String,
}

async fn handle_search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    let articles = state.blog.search_posts(&form.search).await?;
    let html = state
        .templates
        .render("partials/articles.html", context! { articles => articles })?;
    Ok(Html(html))
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
