//! JSON REST API for Revu.
//!
//! Exposes an axum [`Router`] driving a [`revu_core::Engine`] over any
//! [`revu_core::store::Store`]. Health checks, tracing and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! Router::new().merge(revu_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod pull_requests;
pub mod stats;
pub mod teams;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use revu_core::{Engine, store::Store};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S: Store>(engine: Arc<Engine<S>>) -> Router<()> {
  Router::new()
    // Teams
    .route("/team/add", post(teams::add::<S>))
    .route("/team/get", get(teams::get_one::<S>))
    .route("/team/deactivate", post(teams::deactivate::<S>))
    // Users
    .route("/users/setIsActive", post(users::set_is_active::<S>))
    .route("/users/getReview", get(users::get_review::<S>))
    // Pull requests
    .route("/pullRequest/create", post(pull_requests::create::<S>))
    .route("/pullRequest/merge", post(pull_requests::merge::<S>))
    .route("/pullRequest/reassign", post(pull_requests::reassign::<S>))
    // Stats
    .route("/stats", get(stats::handler::<S>))
    .with_state(engine)
}

#[cfg(test)]
mod tests;
