//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; statuses as their upper-case
//! names; the active flag as `0`/`1`.

use chrono::{DateTime, Utc};
use revu_core::{
  pull_request::{PrStatus, PullRequest, PullRequestShort},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PrStatus ────────────────────────────────────────────────────────────────

pub fn encode_status(s: PrStatus) -> String { s.to_string() }

pub fn decode_status(s: &str) -> Result<PrStatus> {
  s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`user_from_row`].
pub const USER_COLUMNS: &str = "user_id, username, team_name, is_active";

/// A `users` row; needs no decoding beyond what rusqlite does.
pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    user_id:   row.get(0)?,
    username:  row.get(1)?,
    team_name: row.get(2)?,
    is_active: row.get(3)?,
  })
}

/// Column list matching [`RawPullRequest::from_row`].
pub const PR_COLUMNS: &str =
  "pull_request_id, pull_request_name, author_id, status, created_at, merged_at";

/// Raw strings read directly from a `pull_requests` row.
pub struct RawPullRequest {
  pub id:         String,
  pub name:       String,
  pub author_id:  String,
  pub status:     String,
  pub created_at: String,
  pub merged_at:  Option<String>,
}

impl RawPullRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      author_id:  row.get(2)?,
      status:     row.get(3)?,
      created_at: row.get(4)?,
      merged_at:  row.get(5)?,
    })
  }

  /// Decode into a domain record carrying `reviewers`.
  pub fn into_pull_request(self, reviewers: Vec<String>) -> Result<PullRequest> {
    Ok(PullRequest {
      id: self.id,
      name: self.name,
      author_id: self.author_id,
      status: decode_status(&self.status)?,
      reviewers,
      created_at: decode_dt(&self.created_at)?,
      merged_at: self.merged_at.as_deref().map(decode_dt).transpose()?,
    })
  }

  pub fn into_short(self) -> Result<PullRequestShort> {
    Ok(PullRequestShort {
      status:    decode_status(&self.status)?,
      id:        self.id,
      name:      self.name,
      author_id: self.author_id,
    })
  }
}
