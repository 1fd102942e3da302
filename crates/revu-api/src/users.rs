//! Handlers for `/users/*` endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use revu_core::{
  Engine,
  pull_request::PullRequestShort,
  store::Store,
  user::User,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, QueryParams, require},
};

// ─── Set active ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
  pub user_id:   String,
  pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
  pub user: User,
}

/// `POST /users/setIsActive`, body: `{"user_id":"u1","is_active":false}`
pub async fn set_is_active<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(body): JsonBody<SetActiveBody>,
) -> Result<Json<UserResponse>, ApiError> {
  require("user_id", &body.user_id)?;
  let user = engine.set_user_active(&body.user_id, body.is_active).await?;
  Ok(Json(UserResponse { user }))
}

// ─── Review queue ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
  pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
  pub user_id:       String,
  pub pull_requests: Vec<PullRequestShort>,
}

/// `GET /users/getReview?user_id=<id>`
pub async fn get_review<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  QueryParams(query): QueryParams<ReviewQuery>,
) -> Result<Json<ReviewResponse>, ApiError> {
  require("user_id", &query.user_id)?;
  let pull_requests = engine.reviews_for_user(&query.user_id).await?;
  Ok(Json(ReviewResponse { user_id: query.user_id, pull_requests }))
}
