//! # mdblog Core
//!
//! Framework-agnostic logic for mdblog: the post model, the storage
//! capability interface, the markdown renderer contract, the file-to-store
//! synchronizer, and the request-handler service.
//!
//! This crate contains no sqlx, axum, or filesystem I/O. The `mdblog` app
//! crate supplies the SQLite [`store::Store`], the pulldown-cmark
//! [`render::Renderer`], and the HTTP adapter.

pub mod error;
pub mod models;
pub mod render;
pub mod service;
pub mod store;
pub mod sync;

pub use error::BlogError;
pub use models::Post;
pub use service::Blog;
