//! Core types and the pull-request lifecycle engine for Revu.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::Store`]; the request layer drives
//! [`engine::Engine`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cascade;
pub mod directory;
pub mod engine;
pub mod error;
pub mod memory;
pub mod pull_request;
pub mod selector;
pub mod stats;
pub mod store;
pub mod user;

pub use engine::Engine;
pub use error::{
  CascadeError, Conflict, CreateError, DirectoryError, MergeError,
  ReassignError, StoreError,
};
