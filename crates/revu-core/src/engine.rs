//! The pull-request lifecycle engine.
//!
//! Each public operation is one call to [`Store::transaction`]: existence and
//! status checks, candidate selection and the write all happen inside the
//! same unit of work, so two concurrent calls against the same pull request
//! cannot both act on a state the other has already changed.

use chrono::{DateTime, Utc};

use crate::{
  error::{Conflict, CreateError, MergeError, ReassignError, StoreError},
  pull_request::{NewPullRequest, PrStatus, PullRequest, Reassignment},
  selector::{INITIAL_REVIEWERS, select_reviewers},
  stats::Stats,
  store::{Store, Tx},
  user::User,
};

/// Orchestrates reviewer selection and the store's transactional writes.
///
/// Cloning is as cheap as cloning the store handle.
#[derive(Debug, Clone)]
pub struct Engine<S> {
  store: S,
}

impl<S: Store> Engine<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Create ────────────────────────────────────────────────────────────

  /// Create an `OPEN` pull request and assign up to two reviewers from the
  /// author's team.
  pub async fn create_pull_request(
    &self,
    input: NewPullRequest,
  ) -> Result<PullRequest, CreateError> {
    let now = Utc::now();
    let pr = self
      .store
      .transaction(move |tx| create_in(tx, input, now))
      .await?;

    tracing::info!(
      pr = %pr.id,
      author = %pr.author_id,
      reviewers = ?pr.reviewers,
      "pull request created"
    );
    Ok(pr)
  }

  // ── Merge ─────────────────────────────────────────────────────────────

  /// Mark a pull request `MERGED`. Merging an already-merged pull request
  /// returns it unchanged.
  pub async fn merge_pull_request(
    &self,
    id: &str,
  ) -> Result<PullRequest, MergeError> {
    let id = id.to_owned();
    let now = Utc::now();
    let (pr, changed) = self
      .store
      .transaction(move |tx| merge_in(tx, &id, now))
      .await?;

    if changed {
      tracing::info!(pr = %pr.id, "pull request merged");
    } else {
      tracing::debug!(pr = %pr.id, "pull request already merged");
    }
    Ok(pr)
  }

  // ── Reassign ──────────────────────────────────────────────────────────

  /// Replace `old_reviewer` on an open pull request with the first eligible
  /// active member of the old reviewer's team.
  pub async fn reassign_reviewer(
    &self,
    id: &str,
    old_reviewer: &str,
  ) -> Result<Reassignment, ReassignError> {
    let id = id.to_owned();
    let old_reviewer = old_reviewer.to_owned();
    let outcome = self
      .store
      .transaction(move |tx| reassign_in(tx, &id, &old_reviewer))
      .await?;

    tracing::info!(
      pr = %outcome.pull_request.id,
      from = %outcome.replaced,
      to = %outcome.replaced_by,
      "reviewer reassigned"
    );
    Ok(outcome)
  }

  // ── Stats ─────────────────────────────────────────────────────────────

  /// Aggregate counts over pull requests, users and teams, read from one
  /// consistent snapshot.
  pub async fn stats(&self) -> Result<Stats, StoreError> {
    self.store.transaction(|tx| Stats::collect(tx)).await
  }
}

// ─── Units of work ───────────────────────────────────────────────────────────

fn create_in(
  tx: &mut dyn Tx,
  input: NewPullRequest,
  now: DateTime<Utc>,
) -> Result<PullRequest, CreateError> {
  if tx.pull_request_exists(&input.id)? {
    return Err(CreateError::AlreadyExists(input.id));
  }

  let Some(author) = tx.get_user(&input.author_id)? else {
    return Err(CreateError::AuthorNotFound(input.author_id));
  };

  let roster = tx.list_active_members(&author.team_name)?;
  let reviewers = select_reviewers(&roster, &author.user_id, INITIAL_REVIEWERS);

  let pr = PullRequest {
    id: input.id,
    name: input.name,
    author_id: input.author_id,
    status: PrStatus::Open,
    reviewers,
    created_at: now,
    merged_at: None,
  };
  tx.insert_pull_request(&pr)?;
  Ok(pr)
}

/// Returns the pull request and whether this call changed it.
fn merge_in(
  tx: &mut dyn Tx,
  id: &str,
  now: DateTime<Utc>,
) -> Result<(PullRequest, bool), MergeError> {
  let mut pr = tx
    .get_pull_request(id)?
    .ok_or_else(|| MergeError::NotFound(id.to_owned()))?;

  if pr.status.is_terminal() {
    return Ok((pr, false));
  }

  tx.mark_merged(id, now)?;
  pr.status = PrStatus::Merged;
  pr.merged_at = Some(now);
  Ok((pr, true))
}

/// Shared by [`Engine::reassign_reviewer`] and the team cascade.
pub(crate) fn reassign_in(
  tx: &mut dyn Tx,
  id: &str,
  old_reviewer: &str,
) -> Result<Reassignment, ReassignError> {
  let mut pr = tx
    .get_pull_request(id)?
    .ok_or_else(|| ReassignError::NotFound(id.to_owned()))?;

  if pr.status.is_terminal() {
    return Err(Conflict::Merged.into());
  }
  if !pr.has_reviewer(old_reviewer) {
    return Err(Conflict::NotAssigned.into());
  }

  let old_user = tx.get_user(old_reviewer)?.ok_or_else(|| {
    StoreError::new(format!(
      "reviewer {old_reviewer} on pull request {id} has no user record"
    ))
  })?;
  let pool = candidate_pool(tx, &pr, &old_user)?;
  let new_reviewer = select_reviewers(&pool, old_reviewer, 1)
    .into_iter()
    .next()
    .ok_or(Conflict::NoCandidate)?;

  tx.replace_reviewer(id, old_reviewer, &new_reviewer)?;
  for r in pr.reviewers.iter_mut().filter(|r| r.as_str() == old_reviewer) {
    *r = new_reviewer.clone();
  }

  Ok(Reassignment {
    pull_request: pr,
    replaced:     old_reviewer.to_owned(),
    replaced_by:  new_reviewer,
  })
}

/// Active members of the old reviewer's team who are neither the author nor
/// already reviewing `pr`.
///
/// The author is excluded here as well as at creation: otherwise a reassign
/// on a team whose only spare member is the author would make the author
/// review their own pull request.
fn candidate_pool(
  tx: &mut dyn Tx,
  pr: &PullRequest,
  old_reviewer: &User,
) -> Result<Vec<User>, StoreError> {
  let roster = tx.list_active_members(&old_reviewer.team_name)?;
  Ok(
    roster
      .into_iter()
      .filter(|u| u.user_id != pr.author_id && !pr.has_reviewer(&u.user_id))
      .collect(),
  )
}
