//! Users and teams: the directory side of the data model.
//!
//! The lifecycle engine reads team rosters to pick reviewers and only ever
//! writes a user's `is_active` flag. Roster order is the directory's stable
//! enumeration order (insertion order) and is what reviewer selection breaks
//! ties on.

use serde::{Deserialize, Serialize};

/// A user as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:   String,
  pub username:  String,
  pub team_name: String,
  /// Only active users are eligible reviewer candidates.
  pub is_active: bool,
}

/// A team member as it appears inside a [`Team`] (the team name is implied).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
  pub user_id:   String,
  pub username:  String,
  pub is_active: bool,
}

impl TeamMember {
  pub fn into_user(self, team_name: &str) -> User {
    User {
      user_id:   self.user_id,
      username:  self.username,
      team_name: team_name.to_owned(),
      is_active: self.is_active,
    }
  }
}

impl From<User> for TeamMember {
  fn from(u: User) -> Self {
    Self {
      user_id:   u.user_id,
      username:  u.username,
      is_active: u.is_active,
    }
  }
}

/// A team and its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub team_name: String,
  pub members:   Vec<TeamMember>,
}
