//! Handlers for `/team/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/team/add` | Body: a team with its members; 201 |
//! | `GET`  | `/team/get` | `?team_name=`; 404 if unknown |
//! | `POST` | `/team/deactivate` | Body: `{"team_name":..}`; reassigns reviewers |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use revu_core::{
  Engine,
  cascade::ReviewerChange,
  store::Store,
  user::Team,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  error::ApiError,
  extract::{JsonBody, QueryParams, require},
};

// ─── Add ─────────────────────────────────────────────────────────────────────

/// `POST /team/add`
pub async fn add<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(team): JsonBody<Team>,
) -> Result<impl IntoResponse, ApiError> {
  require("team_name", &team.team_name)?;
  for m in &team.members {
    require("user_id", &m.user_id)?;
  }

  let team = engine.add_team(team).await?;
  Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TeamQuery {
  pub team_name: String,
}

/// `GET /team/get?team_name=<name>`
pub async fn get_one<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  QueryParams(query): QueryParams<TeamQuery>,
) -> Result<Json<Team>, ApiError> {
  require("team_name", &query.team_name)?;
  Ok(Json(engine.get_team(&query.team_name).await?))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeactivateBody {
  pub team_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeactivateResponse {
  pub message:    &'static str,
  pub reassigned: Vec<ReviewerChange>,
}

/// `POST /team/deactivate`
pub async fn deactivate<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(body): JsonBody<DeactivateBody>,
) -> Result<Json<DeactivateResponse>, ApiError> {
  require("team_name", &body.team_name)?;
  let report = engine.deactivate_team_cascade(&body.team_name).await?;
  Ok(Json(DeactivateResponse {
    message:    "team deactivated and PR reviewers reassigned",
    reassigned: report.reassigned,
  }))
}
