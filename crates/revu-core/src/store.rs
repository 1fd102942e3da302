//! The `Store` trait and the unit-of-work interface it hands to callers.
//!
//! Storage backends (e.g. `revu-store-sqlite`, [`crate::memory`]) implement
//! both traits. The engine never talks to a backend outside a transaction:
//! every operation is a closure over `&mut dyn Tx` that the backend runs
//! atomically.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  error::StoreError,
  pull_request::{PullRequest, PullRequestShort},
  user::User,
};

// ─── Unit of work ────────────────────────────────────────────────────────────

/// Reads and writes available inside one transaction.
///
/// All methods are synchronous; the only suspension point of an engine call
/// is [`Store::transaction`] itself. Any `Err` returned here should be
/// propagated so the transaction rolls back.
pub trait Tx {
  // ── Directory ─────────────────────────────────────────────────────────

  fn get_user(&mut self, user_id: &str) -> Result<Option<User>, StoreError>;

  /// Every member of `team_name`, in roster order.
  fn list_team_members(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<User>, StoreError>;

  /// Active members of `team_name`, in roster order.
  fn list_active_members(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<User>, StoreError>;

  fn list_users(&mut self) -> Result<Vec<User>, StoreError>;

  fn team_exists(&mut self, team_name: &str) -> Result<bool, StoreError>;

  fn list_teams(&mut self) -> Result<Vec<String>, StoreError>;

  fn insert_team(&mut self, team_name: &str) -> Result<(), StoreError>;

  /// Insert `user`, or overwrite name, team and flag of an existing user with
  /// the same id. An existing user keeps its roster position.
  fn upsert_user(&mut self, user: &User) -> Result<(), StoreError>;

  /// Returns `false` if no such user exists.
  fn set_user_active(
    &mut self,
    user_id: &str,
    active: bool,
  ) -> Result<bool, StoreError>;

  /// Bulk update of every member of `team_name`. Returns the number of users
  /// touched.
  fn set_active_for_team(
    &mut self,
    team_name: &str,
    active: bool,
  ) -> Result<usize, StoreError>;

  // ── Pull requests ─────────────────────────────────────────────────────

  fn pull_request_exists(&mut self, id: &str) -> Result<bool, StoreError>;

  fn get_pull_request(
    &mut self,
    id: &str,
  ) -> Result<Option<PullRequest>, StoreError>;

  /// Insert the pull request row and one reviewer edge per entry of
  /// `pr.reviewers`.
  fn insert_pull_request(&mut self, pr: &PullRequest)
  -> Result<(), StoreError>;

  /// Swap the edge `(pr_id, old_reviewer)` for `(pr_id, new_reviewer)`,
  /// keeping its position.
  fn replace_reviewer(
    &mut self,
    pr_id: &str,
    old_reviewer: &str,
    new_reviewer: &str,
  ) -> Result<(), StoreError>;

  fn mark_merged(
    &mut self,
    pr_id: &str,
    merged_at: DateTime<Utc>,
  ) -> Result<(), StoreError>;

  /// All pull requests, in creation order.
  fn list_pull_requests(&mut self) -> Result<Vec<PullRequest>, StoreError>;

  /// Pull requests on which `user_id` is an assigned reviewer.
  fn reviews_for_user(
    &mut self,
    user_id: &str,
  ) -> Result<Vec<PullRequestShort>, StoreError>;

  /// Open pull requests authored by, or reviewed by, any member of
  /// `team_name`.
  fn open_pull_requests_for_team(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<PullRequest>, StoreError>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a transactional storage backend.
///
/// `transaction` runs `work` inside one serialisable transaction. It commits
/// if and only if `work` returns `Ok`; on `Err` (or if commit itself fails)
/// nothing `work` wrote is visible afterwards. Concurrent transactions never
/// interleave their check and write phases.
pub trait Store: Send + Sync + 'static {
  fn transaction<T, E, F>(
    &self,
    work: F,
  ) -> impl Future<Output = Result<T, E>> + Send + '_
  where
    T: Send + 'static,
    E: From<StoreError> + Send + 'static,
    F: FnOnce(&mut dyn Tx) -> Result<T, E> + Send + 'static;
}
