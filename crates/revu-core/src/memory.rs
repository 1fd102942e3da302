//! In-memory [`Store`] implementation.
//!
//! Each transaction runs against a private copy of the state while holding
//! the store's lock; the copy replaces the live state only if the work
//! returns `Ok`. Useful for tests and for embedding the engine without a
//! database.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::{
  error::StoreError,
  pull_request::{PrStatus, PullRequest, PullRequestShort},
  store::{Store, Tx},
  user::User,
};

#[derive(Debug, Clone, Default)]
struct State {
  teams:         Vec<String>,
  /// Roster order is insertion order.
  users:         Vec<User>,
  pull_requests: Vec<PullRequest>,
}

/// A [`Store`] that lives entirely in process memory.
///
/// Cloning is cheap; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
  state: Arc<Mutex<State>>,
}

impl InMemoryStore {
  pub fn new() -> Self { Self::default() }

  fn run<T, E, F>(&self, work: F) -> Result<T, E>
  where
    E: From<StoreError>,
    F: FnOnce(&mut dyn Tx) -> Result<T, E>,
  {
    let mut live = self
      .state
      .lock()
      .map_err(|_| StoreError::new("in-memory store lock poisoned"))?;
    let mut snapshot = live.clone();
    let out = work(&mut snapshot)?;
    *live = snapshot;
    Ok(out)
  }
}

impl Store for InMemoryStore {
  async fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
  where
    T: Send + 'static,
    E: From<StoreError> + Send + 'static,
    F: FnOnce(&mut dyn Tx) -> Result<T, E> + Send + 'static,
  {
    self.run(work)
  }
}

impl State {
  fn pr_mut(&mut self, id: &str) -> Result<&mut PullRequest, StoreError> {
    self
      .pull_requests
      .iter_mut()
      .find(|pr| pr.id == id)
      .ok_or_else(|| StoreError::new(format!("pull request {id} missing")))
  }

  fn team_members(&self, team_name: &str) -> impl Iterator<Item = &User> {
    self.users.iter().filter(move |u| u.team_name == team_name)
  }
}

impl Tx for State {
  fn get_user(&mut self, user_id: &str) -> Result<Option<User>, StoreError> {
    Ok(self.users.iter().find(|u| u.user_id == user_id).cloned())
  }

  fn list_team_members(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<User>, StoreError> {
    Ok(self.team_members(team_name).cloned().collect())
  }

  fn list_active_members(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<User>, StoreError> {
    Ok(
      self
        .team_members(team_name)
        .filter(|u| u.is_active)
        .cloned()
        .collect(),
    )
  }

  fn list_users(&mut self) -> Result<Vec<User>, StoreError> {
    Ok(self.users.clone())
  }

  fn team_exists(&mut self, team_name: &str) -> Result<bool, StoreError> {
    Ok(self.teams.iter().any(|t| t == team_name))
  }

  fn list_teams(&mut self) -> Result<Vec<String>, StoreError> {
    Ok(self.teams.clone())
  }

  fn insert_team(&mut self, team_name: &str) -> Result<(), StoreError> {
    if self.teams.iter().any(|t| t == team_name) {
      return Err(StoreError::new(format!("duplicate team {team_name}")));
    }
    self.teams.push(team_name.to_owned());
    Ok(())
  }

  fn upsert_user(&mut self, user: &User) -> Result<(), StoreError> {
    if !self.teams.iter().any(|t| *t == user.team_name) {
      return Err(StoreError::new(format!("unknown team {}", user.team_name)));
    }
    match self.users.iter_mut().find(|u| u.user_id == user.user_id) {
      Some(existing) => *existing = user.clone(),
      None => self.users.push(user.clone()),
    }
    Ok(())
  }

  fn set_user_active(
    &mut self,
    user_id: &str,
    active: bool,
  ) -> Result<bool, StoreError> {
    match self.users.iter_mut().find(|u| u.user_id == user_id) {
      Some(u) => {
        u.is_active = active;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  fn set_active_for_team(
    &mut self,
    team_name: &str,
    active: bool,
  ) -> Result<usize, StoreError> {
    let mut touched = 0;
    for u in self.users.iter_mut().filter(|u| u.team_name == team_name) {
      u.is_active = active;
      touched += 1;
    }
    Ok(touched)
  }

  fn pull_request_exists(&mut self, id: &str) -> Result<bool, StoreError> {
    Ok(self.pull_requests.iter().any(|pr| pr.id == id))
  }

  fn get_pull_request(
    &mut self,
    id: &str,
  ) -> Result<Option<PullRequest>, StoreError> {
    Ok(self.pull_requests.iter().find(|pr| pr.id == id).cloned())
  }

  fn insert_pull_request(&mut self, pr: &PullRequest) -> Result<(), StoreError> {
    if self.pull_requests.iter().any(|p| p.id == pr.id) {
      return Err(StoreError::new(format!("duplicate pull request {}", pr.id)));
    }
    self.pull_requests.push(pr.clone());
    Ok(())
  }

  fn replace_reviewer(
    &mut self,
    pr_id: &str,
    old_reviewer: &str,
    new_reviewer: &str,
  ) -> Result<(), StoreError> {
    let pr = self.pr_mut(pr_id)?;
    if pr.has_reviewer(new_reviewer) {
      return Err(StoreError::new(format!(
        "{new_reviewer} already reviews {pr_id}"
      )));
    }
    let slot = pr
      .reviewers
      .iter_mut()
      .find(|r| r.as_str() == old_reviewer)
      .ok_or_else(|| {
        StoreError::new(format!("{old_reviewer} does not review {pr_id}"))
      })?;
    *slot = new_reviewer.to_owned();
    Ok(())
  }

  fn mark_merged(
    &mut self,
    pr_id: &str,
    merged_at: DateTime<Utc>,
  ) -> Result<(), StoreError> {
    let pr = self.pr_mut(pr_id)?;
    pr.status = PrStatus::Merged;
    pr.merged_at = Some(merged_at);
    Ok(())
  }

  fn list_pull_requests(&mut self) -> Result<Vec<PullRequest>, StoreError> {
    Ok(self.pull_requests.clone())
  }

  fn reviews_for_user(
    &mut self,
    user_id: &str,
  ) -> Result<Vec<PullRequestShort>, StoreError> {
    Ok(
      self
        .pull_requests
        .iter()
        .filter(|pr| pr.has_reviewer(user_id))
        .map(PullRequest::short)
        .collect(),
    )
  }

  fn open_pull_requests_for_team(
    &mut self,
    team_name: &str,
  ) -> Result<Vec<PullRequest>, StoreError> {
    let members: Vec<&str> = self
      .team_members(team_name)
      .map(|u| u.user_id.as_str())
      .collect();
    Ok(
      self
        .pull_requests
        .iter()
        .filter(|pr| pr.is_open())
        .filter(|pr| {
          members.contains(&pr.author_id.as_str())
            || pr.reviewers.iter().any(|r| members.contains(&r.as_str()))
        })
        .cloned()
        .collect(),
    )
  }
}
