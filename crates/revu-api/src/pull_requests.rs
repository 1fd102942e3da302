//! Handlers for `/pullRequest/*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pullRequest/create` | 201; 409 `PR_EXISTS`; 404 unknown author |
//! | `POST` | `/pullRequest/merge` | Idempotent |
//! | `POST` | `/pullRequest/reassign` | 409 `PR_MERGED`, `NOT_ASSIGNED`, `NO_CANDIDATE` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use revu_core::{
  Engine,
  pull_request::{NewPullRequest, PullRequest, Reassignment},
  store::Store,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, require},
};

#[derive(Debug, Serialize)]
pub struct PrResponse {
  pub pr: PullRequest,
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub pull_request_id:   String,
  pub pull_request_name: String,
  pub author_id:         String,
}

/// `POST /pullRequest/create`
pub async fn create<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  require("pull_request_id", &body.pull_request_id)?;
  require("author_id", &body.author_id)?;

  let pr = engine
    .create_pull_request(NewPullRequest {
      id:        body.pull_request_id,
      name:      body.pull_request_name,
      author_id: body.author_id,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(PrResponse { pr })))
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MergeBody {
  pub pull_request_id: String,
}

/// `POST /pullRequest/merge`
pub async fn merge<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(body): JsonBody<MergeBody>,
) -> Result<Json<PrResponse>, ApiError> {
  require("pull_request_id", &body.pull_request_id)?;
  let pr = engine.merge_pull_request(&body.pull_request_id).await?;
  Ok(Json(PrResponse { pr }))
}

// ─── Reassign ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReassignBody {
  pub pull_request_id: String,
  pub old_user_id:     String,
}

/// `POST /pullRequest/reassign`: responds with the updated pull request and
/// the replacement reviewer's id.
pub async fn reassign<S: Store>(
  State(engine): State<Arc<Engine<S>>>,
  JsonBody(body): JsonBody<ReassignBody>,
) -> Result<Json<Reassignment>, ApiError> {
  require("pull_request_id", &body.pull_request_id)?;
  require("old_user_id", &body.old_user_id)?;
  let out = engine
    .reassign_reviewer(&body.pull_request_id, &body.old_user_id)
    .await?;
  Ok(Json(out))
}
