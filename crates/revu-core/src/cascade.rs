//! Team deactivation with reviewer reassignment.
//!
//! Deactivating a team commits on its own before any reassignment runs, so a
//! failed reassignment never rolls the deactivation back. Each stale reviewer
//! edge is then reassigned in its own transaction and failures are collected
//! rather than aborting the cascade.

use serde::Serialize;

use crate::{
  engine::{Engine, reassign_in},
  error::{CascadeError, Conflict, ReassignError, StoreError},
  pull_request::Reassignment,
  store::{Store, Tx},
};

// ─── Report ──────────────────────────────────────────────────────────────────

/// One reviewer edge moved by the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerChange {
  pub pull_request_id: String,
  pub replaced:        String,
  pub replaced_by:     String,
}

impl From<Reassignment> for ReviewerChange {
  fn from(r: Reassignment) -> Self {
    Self {
      pull_request_id: r.pull_request.id,
      replaced:        r.replaced,
      replaced_by:     r.replaced_by,
    }
  }
}

/// A stale reviewer edge the cascade could not move.
#[derive(Debug)]
pub struct CascadeFailure {
  pub pull_request_id: String,
  pub reviewer_id:     String,
  pub error:           ReassignError,
}

/// Everything a cascade did, including what it failed to do.
#[derive(Debug)]
pub struct CascadeReport {
  pub team_name:   String,
  /// Every member of the team, all now inactive.
  pub deactivated: Vec<String>,
  pub reassigned:  Vec<ReviewerChange>,
  pub failures:    Vec<CascadeFailure>,
}

// ─── Engine operation ────────────────────────────────────────────────────────

impl<S: Store> Engine<S> {
  /// Deactivate every member of `team_name`, then reassign every inactive
  /// reviewer on each open pull request the team authored or reviews.
  ///
  /// Returns [`CascadeError::PartialFailure`] carrying the full report if any
  /// reassignment failed; the deactivation itself stays committed.
  pub async fn deactivate_team_cascade(
    &self,
    team_name: &str,
  ) -> Result<CascadeReport, CascadeError> {
    let team = team_name.to_owned();
    let deactivated = self
      .store()
      .transaction(move |tx| -> Result<Vec<String>, CascadeError> {
        if !tx.team_exists(&team)? {
          return Err(CascadeError::TeamNotFound(team));
        }
        let members = tx.list_team_members(&team)?;
        tx.set_active_for_team(&team, false)?;
        Ok(members.into_iter().map(|u| u.user_id).collect())
      })
      .await?;

    tracing::info!(
      team = %team_name,
      users = deactivated.len(),
      "team deactivated"
    );

    let team = team_name.to_owned();
    let targets = self
      .store()
      .transaction(move |tx| stale_reviewers(tx, &team))
      .await?;

    let mut report = CascadeReport {
      team_name: team_name.to_owned(),
      deactivated,
      reassigned: Vec::new(),
      failures: Vec::new(),
    };

    for (pr_id, reviewer) in targets {
      let (id, old) = (pr_id.clone(), reviewer.clone());
      let outcome = self
        .store()
        .transaction(move |tx| reassign_inactive_in(tx, &id, &old))
        .await;

      match outcome {
        Ok(Some(change)) => report.reassigned.push(change),
        Ok(None) => {
          tracing::debug!(pr = %pr_id, reviewer = %reviewer, "reassignment no longer needed");
        }
        Err(error) => {
          tracing::warn!(pr = %pr_id, reviewer = %reviewer, %error, "cascade reassignment failed");
          report.failures.push(CascadeFailure {
            pull_request_id: pr_id,
            reviewer_id: reviewer,
            error,
          });
        }
      }
    }

    tracing::info!(
      team = %team_name,
      reassigned = report.reassigned.len(),
      failed = report.failures.len(),
      "team cascade finished"
    );

    if report.failures.is_empty() {
      Ok(report)
    } else {
      Err(CascadeError::PartialFailure(report))
    }
  }
}

// ─── Units of work ───────────────────────────────────────────────────────────

/// `(pull request, reviewer)` pairs where the reviewer is inactive, over the
/// open pull requests touched by `team_name`.
fn stale_reviewers(
  tx: &mut dyn Tx,
  team_name: &str,
) -> Result<Vec<(String, String)>, StoreError> {
  let mut stale = Vec::new();
  for pr in tx.open_pull_requests_for_team(team_name)? {
    for reviewer in &pr.reviewers {
      let active = tx.get_user(reviewer)?.is_some_and(|u| u.is_active);
      if !active {
        stale.push((pr.id.clone(), reviewer.clone()));
      }
    }
  }
  Ok(stale)
}

/// Reassign `reviewer` on `pr_id` if the edge is still stale.
///
/// `Ok(None)` means the state moved on since the targets were collected: the
/// pull request was merged, the edge is gone, or the reviewer is active again.
fn reassign_inactive_in(
  tx: &mut dyn Tx,
  pr_id: &str,
  reviewer: &str,
) -> Result<Option<ReviewerChange>, ReassignError> {
  if tx.get_user(reviewer)?.is_some_and(|u| u.is_active) {
    return Ok(None);
  }

  match reassign_in(tx, pr_id, reviewer) {
    Ok(r) => Ok(Some(r.into())),
    Err(
      ReassignError::NotFound(_)
      | ReassignError::Conflict(Conflict::Merged | Conflict::NotAssigned),
    ) => Ok(None),
    Err(e) => Err(e),
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    Engine,
    error::{CascadeError, Conflict, ReassignError},
    memory::InMemoryStore,
    pull_request::NewPullRequest,
    store::Store,
    user::{Team, TeamMember, User},
  };

  fn team(name: &str, ids: &[&str]) -> Team {
    Team {
      team_name: name.to_owned(),
      members:   ids
        .iter()
        .map(|id| TeamMember {
          user_id:   (*id).to_owned(),
          username:  (*id).to_owned(),
          is_active: true,
        })
        .collect(),
    }
  }

  fn new_pr(id: &str, author: &str) -> NewPullRequest {
    NewPullRequest {
      id:        id.to_owned(),
      name:      id.to_owned(),
      author_id: author.to_owned(),
    }
  }

  async fn user(engine: &Engine<InMemoryStore>, id: &str) -> User {
    let id = id.to_owned();
    engine
      .store()
      .transaction(move |tx| tx.get_user(&id))
      .await
      .unwrap()
      .unwrap()
  }

  #[tokio::test]
  async fn unknown_team_is_not_found() {
    let engine = Engine::new(InMemoryStore::new());
    let err = engine.deactivate_team_cascade("ghosts").await.unwrap_err();
    assert!(matches!(err, CascadeError::TeamNotFound(t) if t == "ghosts"));
  }

  #[tokio::test]
  async fn deactivates_members_with_no_open_prs() {
    let engine = Engine::new(InMemoryStore::new());
    engine.add_team(team("core", &["u1", "u2"])).await.unwrap();

    let report = engine.deactivate_team_cascade("core").await.unwrap();
    assert_eq!(report.deactivated, vec!["u1", "u2"]);
    assert!(report.reassigned.is_empty());
    assert!(!user(&engine, "u1").await.is_active);
    assert!(!user(&engine, "u2").await.is_active);
  }

  #[tokio::test]
  async fn reassigns_inactive_reviewers_on_team_authored_prs() {
    let engine = Engine::new(InMemoryStore::new());
    engine
      .add_team(team("core", &["a1", "r1", "r2", "r3"]))
      .await
      .unwrap();
    let pr = engine
      .create_pull_request(new_pr("pr-1", "a1"))
      .await
      .unwrap();
    assert_eq!(pr.reviewers, vec!["r1", "r2"]);

    // r1 goes on leave and the author moves to a new team.
    engine.set_user_active("r1", false).await.unwrap();
    engine.add_team(team("platform", &["a1"])).await.unwrap();

    let report = engine.deactivate_team_cascade("platform").await.unwrap();
    assert_eq!(report.deactivated, vec!["a1"]);
    assert_eq!(report.reassigned.len(), 1);
    assert_eq!(report.reassigned[0].pull_request_id, "pr-1");
    assert_eq!(report.reassigned[0].replaced, "r1");
    assert_eq!(report.reassigned[0].replaced_by, "r3");

    let pr = engine
      .store()
      .transaction(|tx| tx.get_pull_request("pr-1"))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(pr.reviewers, vec!["r3", "r2"]);
  }

  #[tokio::test]
  async fn same_team_reviewers_surface_partial_failure() {
    let engine = Engine::new(InMemoryStore::new());
    engine.add_team(team("core", &["u1", "u2", "u3"])).await.unwrap();
    engine
      .create_pull_request(new_pr("pr-1", "u1"))
      .await
      .unwrap();
    engine
      .create_pull_request(new_pr("pr-2", "u2"))
      .await
      .unwrap();
    engine.merge_pull_request("pr-2").await.unwrap();

    let err = engine.deactivate_team_cascade("core").await.unwrap_err();
    let CascadeError::PartialFailure(report) = err else {
      panic!("expected partial failure, got {err:?}");
    };

    // The deactivation is committed regardless.
    assert!(!user(&engine, "u1").await.is_active);

    // Only the open PR is touched; both of its reviewers lack a candidate.
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.pull_request_id == "pr-1"
      && matches!(f.error, ReassignError::Conflict(Conflict::NoCandidate))));
  }
}
