//! Directory operations: team creation and lookup, user activation and the
//! reviewer's view of assigned pull requests.
//!
//! These carry little business logic but go through the same transactional
//! store as the lifecycle operations.

use crate::{
  engine::Engine,
  error::DirectoryError,
  pull_request::PullRequestShort,
  store::{Store, Tx},
  user::{Team, TeamMember, User},
};

impl<S: Store> Engine<S> {
  /// Create `team` and upsert its members. Existing users named in the
  /// roster move to this team.
  pub async fn add_team(&self, team: Team) -> Result<Team, DirectoryError> {
    let created = self
      .store()
      .transaction(move |tx| {
        if tx.team_exists(&team.team_name)? {
          return Err(DirectoryError::TeamExists(team.team_name));
        }
        tx.insert_team(&team.team_name)?;
        for m in team.members {
          tx.upsert_user(&m.into_user(&team.team_name))?;
        }
        load_team(tx, team.team_name)
      })
      .await?;

    tracing::info!(
      team = %created.team_name,
      members = created.members.len(),
      "team created"
    );
    Ok(created)
  }

  pub async fn get_team(&self, team_name: &str) -> Result<Team, DirectoryError> {
    let team_name = team_name.to_owned();
    self
      .store()
      .transaction(move |tx| {
        if !tx.team_exists(&team_name)? {
          return Err(DirectoryError::TeamNotFound(team_name));
        }
        load_team(tx, team_name)
      })
      .await
  }

  /// Set a single user's active flag. Concurrent writes are last-write-wins.
  pub async fn set_user_active(
    &self,
    user_id: &str,
    active: bool,
  ) -> Result<User, DirectoryError> {
    let id = user_id.to_owned();
    let user = self
      .store()
      .transaction(move |tx| {
        if !tx.set_user_active(&id, active)? {
          return Err(DirectoryError::UserNotFound(id));
        }
        tx.get_user(&id)?.ok_or(DirectoryError::UserNotFound(id))
      })
      .await?;

    tracing::info!(user = %user.user_id, active, "user activity updated");
    Ok(user)
  }

  /// Pull requests on which `user_id` is currently an assigned reviewer.
  pub async fn reviews_for_user(
    &self,
    user_id: &str,
  ) -> Result<Vec<PullRequestShort>, DirectoryError> {
    let id = user_id.to_owned();
    self
      .store()
      .transaction(move |tx| {
        if tx.get_user(&id)?.is_none() {
          return Err(DirectoryError::UserNotFound(id));
        }
        Ok(tx.reviews_for_user(&id)?)
      })
      .await
  }
}

fn load_team(tx: &mut dyn Tx, team_name: String) -> Result<Team, DirectoryError> {
  let members = tx
    .list_team_members(&team_name)?
    .into_iter()
    .map(TeamMember::from)
    .collect();
  Ok(Team { team_name, members })
}
