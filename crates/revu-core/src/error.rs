//! Error types for `revu-core`.
//!
//! Every engine operation has its own closed error enum so callers can match
//! exhaustively on the outcomes that operation can actually produce.

use thiserror::Error;

use crate::cascade::CascadeReport;

// ─── Storage failure ─────────────────────────────────────────────────────────

/// An unexpected failure of the storage backend.
///
/// Raising one from inside a unit of work aborts the enclosing transaction;
/// nothing written in that transaction is committed.
#[derive(Debug, Error)]
#[error("storage failure: {0}")]
pub struct StoreError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
  pub fn new(
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Self(source.into())
  }
}

// ─── Per-operation errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CreateError {
  #[error("pull request {0} already exists")]
  AlreadyExists(String),

  #[error("author {0} not found")]
  AuthorNotFound(String),

  #[error(transparent)]
  Unexpected(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum MergeError {
  #[error("pull request {0} not found")]
  NotFound(String),

  #[error(transparent)]
  Unexpected(#[from] StoreError),
}

/// A business-rule violation on an otherwise valid pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
  #[error("pull request is already merged")]
  Merged,

  #[error("user is not assigned as a reviewer")]
  NotAssigned,

  #[error("no active replacement candidate")]
  NoCandidate,
}

#[derive(Debug, Error)]
pub enum ReassignError {
  #[error("pull request {0} not found")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(Conflict),

  #[error(transparent)]
  Unexpected(#[from] StoreError),
}

impl From<Conflict> for ReassignError {
  fn from(c: Conflict) -> Self { Self::Conflict(c) }
}

#[derive(Debug, Error)]
pub enum CascadeError {
  #[error("team {0} not found")]
  TeamNotFound(String),

  /// The team was deactivated but some reviewers could not be reassigned.
  #[error(
    "team {} deactivated; {} reviewer reassignment(s) failed",
    .0.team_name,
    .0.failures.len()
  )]
  PartialFailure(CascadeReport),

  #[error(transparent)]
  Unexpected(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
  #[error("team {0} already exists")]
  TeamExists(String),

  #[error("team {0} not found")]
  TeamNotFound(String),

  #[error("user {0} not found")]
  UserNotFound(String),

  #[error(transparent)]
  Unexpected(#[from] StoreError),
}
