//! # blogroll-store
//!
//! Persistence layer for the Blogroll API, backed by SQLite.
//!
//! The crate exposes a synchronous `Database` handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for the two record
//! types, [`Author`] and [`Blogpost`].  Blogposts reference their author by
//! identifier; the author is joined in ("populated") at read time so the
//! derived author display name is never stored.

pub mod authors;
pub mod blogposts;
pub mod database;
pub mod migrations;
pub mod models;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
