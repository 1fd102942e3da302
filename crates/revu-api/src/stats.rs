//! `GET /stats`: aggregate counts over pull requests, users and teams.

use std::sync::Arc;

use axum::{Json, extract::State};
use revu_core::{Engine, stats::Stats, store::Store};

use crate::error::ApiError;

pub async fn handler<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
) -> Result<Json<Stats>, ApiError> {
  Ok(Json(engine.stats().await?))
}
