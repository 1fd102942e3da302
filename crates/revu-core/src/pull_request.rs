//! Pull request records and the lifecycle state they carry.
//!
//! A pull request is created `OPEN` and moves to `MERGED` exactly once.
//! `status == Merged` holds iff `merged_at` is set, and neither ever changes
//! afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PrStatus {
  Open,
  Merged,
}

impl PrStatus {
  pub const ALL: [PrStatus; 2] = [PrStatus::Open, PrStatus::Merged];

  pub fn is_terminal(self) -> bool { matches!(self, Self::Merged) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A pull request together with its reviewer assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
  #[serde(rename = "pull_request_id")]
  pub id:         String,
  #[serde(rename = "pull_request_name")]
  pub name:       String,
  pub author_id:  String,
  pub status:     PrStatus,
  /// Reviewer user ids in assignment order. A user appears at most once.
  #[serde(rename = "assigned_reviewers")]
  pub reviewers:  Vec<String>,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "mergedAt")]
  pub merged_at:  Option<DateTime<Utc>>,
}

impl PullRequest {
  pub fn is_open(&self) -> bool { self.status == PrStatus::Open }

  pub fn has_reviewer(&self, user_id: &str) -> bool {
    self.reviewers.iter().any(|r| r == user_id)
  }

  pub fn short(&self) -> PullRequestShort {
    PullRequestShort {
      id:        self.id.clone(),
      name:      self.name.clone(),
      author_id: self.author_id.clone(),
      status:    self.status,
    }
  }
}

/// The reviewer-facing summary of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
  #[serde(rename = "pull_request_id")]
  pub id:        String,
  #[serde(rename = "pull_request_name")]
  pub name:      String,
  pub author_id: String,
  pub status:    PrStatus,
}

/// Input to [`crate::Engine::create_pull_request`].
///
/// Carries no status: every pull request starts `OPEN`.
#[derive(Debug, Clone)]
pub struct NewPullRequest {
  pub id:        String,
  pub name:      String,
  pub author_id: String,
}

/// The outcome of a successful reviewer reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
  #[serde(rename = "pr")]
  pub pull_request: PullRequest,
  pub replaced:     String,
  pub replaced_by:  String,
}
