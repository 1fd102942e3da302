//! HTTP server assembly for Revu.
//!
//! Wraps the [`revu_api`] router with a health check and per-request tracing.
//! The binary in `main.rs` adds configuration loading and the SQLite store.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use revu_core::{Engine, store::Store};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `REVU_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       8080,
      store_path: PathBuf::from("revu.db"),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router for `engine`.
pub fn app<S: Store>(engine: Arc<Engine<S>>) -> Router {
  Router::new()
    .route("/health", get(health))
    .merge(revu_api::api_router(engine))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{body::Body, http::{Request, StatusCode}};
  use revu_core::memory::InMemoryStore;
  use tower::ServiceExt as _;

  fn router() -> Router { app(Arc::new(Engine::new(InMemoryStore::new()))) }

  #[tokio::test]
  async fn health_returns_ok() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    assert_eq!(&body[..], b"ok");
  }

  #[tokio::test]
  async fn api_routes_are_mounted() {
    let req = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let resp = router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[test]
  fn config_defaults() {
    let cfg = ServerConfig::default();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.store_path, PathBuf::from("revu.db"));
  }
}
