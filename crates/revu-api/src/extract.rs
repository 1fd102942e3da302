//! Extractors that turn axum's rejections into [`ApiError::InvalidInput`].

use axum::extract::{
  FromRequest, FromRequestParts,
  rejection::{JsonRejection, QueryRejection},
};

use crate::error::ApiError;

/// `axum::Json`, rejecting with an `INVALID_INPUT` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query`, rejecting with an `INVALID_INPUT` body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::InvalidInput(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::InvalidInput(rejection.body_text())
  }
}

/// Reject a blank identifier field.
pub fn require(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(())
}
