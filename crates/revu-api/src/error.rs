//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"error": {"code": CODE, "message": text}}`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use revu_core::{
  CascadeError, Conflict, CreateError, DirectoryError, MergeError,
  ReassignError, StoreError, cascade::CascadeReport,
};
use serde_json::{Value, json};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  InvalidInput(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  TeamExists(String),

  #[error("{0}")]
  PrExists(String),

  #[error(transparent)]
  Conflict(Conflict),

  /// Carries the cascade report so the response can list what did move.
  #[error(
    "team {} deactivated; {} reviewer reassignment(s) failed",
    .0.team_name,
    .0.failures.len()
  )]
  PartialFailure(CascadeReport),

  #[error(transparent)]
  Unexpected(StoreError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidInput(_) | ApiError::TeamExists(_) => {
        StatusCode::BAD_REQUEST
      }
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::PrExists(_)
      | ApiError::Conflict(_)
      | ApiError::PartialFailure(_) => StatusCode::CONFLICT,
      ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      ApiError::InvalidInput(_) => "INVALID_INPUT",
      ApiError::NotFound(_) => "NOT_FOUND",
      ApiError::TeamExists(_) => "TEAM_EXISTS",
      ApiError::PrExists(_) => "PR_EXISTS",
      ApiError::Conflict(c) => conflict_code(*c),
      ApiError::PartialFailure(_) => "PARTIAL_FAILURE",
      ApiError::Unexpected(_) => "UNKNOWN_ERROR",
    }
  }
}

fn conflict_code(c: Conflict) -> &'static str {
  match c {
    Conflict::Merged => "PR_MERGED",
    Conflict::NotAssigned => "NOT_ASSIGNED",
    Conflict::NoCandidate => "NO_CANDIDATE",
  }
}

fn error_body(code: &str, message: String) -> Value {
  json!({ "code": code, "message": message })
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let error = error_body(self.code(), self.to_string());

    let body = match self {
      ApiError::Unexpected(e) => {
        tracing::warn!(error = %e, "unexpected error while handling request");
        json!({ "error": error })
      }
      ApiError::PartialFailure(report) => {
        json!({
          "error": error,
          "reassigned": report.reassigned,
          "failures": failures_json(&report),
        })
      }
      _ => json!({ "error": error }),
    };
    (status, Json(body)).into_response()
  }
}

fn failures_json(report: &CascadeReport) -> Vec<Value> {
  report
    .failures
    .iter()
    .map(|f| {
      let code = match &f.error {
        ReassignError::NotFound(_) => "NOT_FOUND",
        ReassignError::Conflict(c) => conflict_code(*c),
        ReassignError::Unexpected(_) => "UNKNOWN_ERROR",
      };
      json!({
        "pull_request_id": f.pull_request_id,
        "reviewer_id": f.reviewer_id,
        "error": error_body(code, f.error.to_string()),
      })
    })
    .collect()
}

// ─── Engine error mapping ────────────────────────────────────────────────────

impl From<CreateError> for ApiError {
  fn from(e: CreateError) -> Self {
    match e {
      CreateError::AlreadyExists(_) => ApiError::PrExists(e.to_string()),
      CreateError::AuthorNotFound(_) => ApiError::NotFound(e.to_string()),
      CreateError::Unexpected(e) => ApiError::Unexpected(e),
    }
  }
}

impl From<MergeError> for ApiError {
  fn from(e: MergeError) -> Self {
    match e {
      MergeError::NotFound(_) => ApiError::NotFound(e.to_string()),
      MergeError::Unexpected(e) => ApiError::Unexpected(e),
    }
  }
}

impl From<ReassignError> for ApiError {
  fn from(e: ReassignError) -> Self {
    match e {
      ReassignError::NotFound(_) => ApiError::NotFound(e.to_string()),
      ReassignError::Conflict(c) => ApiError::Conflict(c),
      ReassignError::Unexpected(e) => ApiError::Unexpected(e),
    }
  }
}

impl From<CascadeError> for ApiError {
  fn from(e: CascadeError) -> Self {
    match e {
      CascadeError::TeamNotFound(_) => ApiError::NotFound(e.to_string()),
      CascadeError::PartialFailure(report) => ApiError::PartialFailure(report),
      CascadeError::Unexpected(e) => ApiError::Unexpected(e),
    }
  }
}

impl From<DirectoryError> for ApiError {
  fn from(e: DirectoryError) -> Self {
    match e {
      DirectoryError::TeamExists(_) => ApiError::TeamExists(e.to_string()),
      DirectoryError::TeamNotFound(_) | DirectoryError::UserNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      DirectoryError::Unexpected(e) => ApiError::Unexpected(e),
    }
  }
}

impl From<StoreError> for ApiError {
  fn from(e: StoreError) -> Self { ApiError::Unexpected(e) }
}
