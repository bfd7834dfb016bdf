//! # blogroll-server
//!
//! REST API for the Blogroll blogging service.
//!
//! This crate provides:
//! - **Blogpost routes**: list, fetch, create, update and delete blogposts,
//!   plus an append-only comment list per blogpost
//! - **Author routes**: create, update and delete authors; deleting an
//!   author removes its blogposts in the same transaction
//! - **Startup / shutdown**: [`run_server`] returns an owned
//!   [`RunningServer`] handle whose [`RunningServer::close`] releases the
//!   database and the listening socket
//!
//! The `blogroll-server` binary is a thin wrapper around [`run_server`].

pub mod api;
pub mod authors;
pub mod blogposts;
pub mod config;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use server::{run_server, RunningServer};
