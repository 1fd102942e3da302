//! Read-only aggregate statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  error::StoreError,
  pull_request::{PrStatus, PullRequest},
  store::Tx,
  user::User,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
  #[serde(rename = "prs")]
  pub pull_requests: PullRequestStats,
  pub users:         UserStats,
  pub teams:         TeamStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestStats {
  #[serde(rename = "total_pull_requests")]
  pub total:                usize,
  /// Always contains every status, zero or not.
  #[serde(rename = "prs_per_status")]
  pub by_status:            BTreeMap<PrStatus, usize>,
  /// Number of pull requests each user currently reviews.
  pub assignments_per_user: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
  #[serde(rename = "total_users")]
  pub total:    usize,
  #[serde(rename = "active_users")]
  pub active:   usize,
  #[serde(rename = "inactive_users")]
  pub inactive: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStats {
  #[serde(rename = "total_teams")]
  pub total:          usize,
  pub users_per_team: BTreeMap<String, usize>,
}

impl Stats {
  pub fn collect(tx: &mut dyn Tx) -> Result<Self, StoreError> {
    let prs = tx.list_pull_requests()?;
    let users = tx.list_users()?;
    let teams = tx.list_teams()?;
    Ok(Self {
      pull_requests: PullRequestStats::from_pull_requests(&prs),
      users:         UserStats::from_users(&users),
      teams:         TeamStats::from_roster(&teams, &users),
    })
  }
}

impl PullRequestStats {
  pub fn from_pull_requests(prs: &[PullRequest]) -> Self {
    let mut by_status: BTreeMap<PrStatus, usize> =
      PrStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    let mut assignments_per_user: BTreeMap<String, usize> = BTreeMap::new();

    for pr in prs {
      *by_status.entry(pr.status).or_default() += 1;
      for reviewer in &pr.reviewers {
        *assignments_per_user.entry(reviewer.clone()).or_default() += 1;
      }
    }

    Self { total: prs.len(), by_status, assignments_per_user }
  }
}

impl UserStats {
  pub fn from_users(users: &[User]) -> Self {
    let active = users.iter().filter(|u| u.is_active).count();
    Self { total: users.len(), active, inactive: users.len() - active }
  }
}

impl TeamStats {
  pub fn from_roster(teams: &[String], users: &[User]) -> Self {
    let mut users_per_team: BTreeMap<String, usize> =
      teams.iter().map(|t| (t.clone(), 0)).collect();
    for u in users {
      *users_per_team.entry(u.team_name.clone()).or_default() += 1;
    }
    Self { total: teams.len(), users_per_team }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn pr(id: &str, status: PrStatus, reviewers: &[&str]) -> PullRequest {
    PullRequest {
      id:         id.to_owned(),
      name:       id.to_owned(),
      author_id:  "a".to_owned(),
      status,
      reviewers:  reviewers.iter().map(|r| (*r).to_owned()).collect(),
      created_at: Utc::now(),
      merged_at:  status.is_terminal().then(Utc::now),
    }
  }

  #[test]
  fn empty_store_reports_both_statuses() {
    let stats = PullRequestStats::from_pull_requests(&[]);
    assert_eq!(stats.total, 0);
    assert_eq!(stats.by_status[&PrStatus::Open], 0);
    assert_eq!(stats.by_status[&PrStatus::Merged], 0);
    assert!(stats.assignments_per_user.is_empty());
  }

  #[test]
  fn counts_statuses_and_assignments() {
    let stats = PullRequestStats::from_pull_requests(&[
      pr("1", PrStatus::Open, &["u1", "u2"]),
      pr("2", PrStatus::Merged, &["u2"]),
      pr("3", PrStatus::Open, &[]),
    ]);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status[&PrStatus::Open], 2);
    assert_eq!(stats.by_status[&PrStatus::Merged], 1);
    assert_eq!(stats.assignments_per_user["u1"], 1);
    assert_eq!(stats.assignments_per_user["u2"], 2);
  }

  #[test]
  fn serialises_with_wire_names() {
    let json = serde_json::to_value(PullRequestStats::from_pull_requests(&[
      pr("1", PrStatus::Merged, &["u1"]),
    ]))
    .unwrap();
    assert_eq!(json["total_pull_requests"], 1);
    assert_eq!(json["prs_per_status"]["MERGED"], 1);
    assert_eq!(json["prs_per_status"]["OPEN"], 0);
    assert_eq!(json["assignments_per_user"]["u1"], 1);
  }

  #[test]
  fn user_and_team_counts() {
    let users = vec![
      User {
        user_id:   "u1".into(),
        username:  "a".into(),
        team_name: "core".into(),
        is_active: true,
      },
      User {
        user_id:   "u2".into(),
        username:  "b".into(),
        team_name: "core".into(),
        is_active: false,
      },
    ];
    let u = UserStats::from_users(&users);
    assert_eq!((u.total, u.active, u.inactive), (2, 1, 1));

    let t = TeamStats::from_roster(&["core".into(), "empty".into()], &users);
    assert_eq!(t.total, 2);
    assert_eq!(t.users_per_team["core"], 2);
    assert_eq!(t.users_per_team["empty"], 0);
  }
}
