//! [`SqliteStore`]: the SQLite implementation of [`Store`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};

use revu_core::{
  error::StoreError,
  pull_request::{PrStatus, PullRequest, PullRequestShort},
  store::{Store, Tx},
  user::User,
};

use crate::{
  Result,
  encode::{
    PR_COLUMNS, RawPullRequest, USER_COLUMNS, encode_dt, encode_status,
    user_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Revu store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, so transactions from different tasks run one
/// after another.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  async fn transaction<T, E, F>(&self, work: F) -> std::result::Result<T, E>
  where
    T: Send + 'static,
    E: From<StoreError> + Send + 'static,
    F: FnOnce(&mut dyn Tx) -> std::result::Result<T, E> + Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = work(&mut SqliteTx { tx: &tx });
        // Dropping an uncommitted transaction rolls it back.
        if result.is_ok() {
          tx.commit()?;
        }
        Ok(result)
      })
      .await
      .map_err(|e| StoreError::from(crate::Error::from(e)))?;

    if outcome.is_err() {
      tracing::debug!("transaction rolled back");
    }
    outcome
  }
}

// ─── Unit of work ────────────────────────────────────────────────────────────

/// [`Tx`] over one open rusqlite transaction.
struct SqliteTx<'a, 'c> {
  tx: &'a Transaction<'c>,
}

impl SqliteTx<'_, '_> {
  fn users_where(
    &self,
    filter: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users {filter} ORDER BY rowid");
    let mut stmt = self.tx.prepare_cached(&sql)?;
    let users = stmt
      .query_map(params, user_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
  }

  fn reviewers_of(&self, pr_id: &str) -> Result<Vec<String>> {
    let mut stmt = self.tx.prepare_cached(
      "SELECT user_id FROM pull_request_reviewers
       WHERE pull_request_id = ?1
       ORDER BY rowid",
    )?;
    let ids = stmt
      .query_map([pr_id], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
  }

  fn pull_requests_where(
    &self,
    filter: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<PullRequest>> {
    let sql = format!(
      "SELECT {PR_COLUMNS} FROM pull_requests {filter} ORDER BY rowid"
    );
    let raws = {
      let mut stmt = self.tx.prepare_cached(&sql)?;
      stmt
        .query_map(params, RawPullRequest::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?
    };

    raws
      .into_iter()
      .map(|raw| {
        let reviewers = self.reviewers_of(&raw.id)?;
        raw.into_pull_request(reviewers)
      })
      .collect()
  }
}

impl Tx for SqliteTx<'_, '_> {
  // ── Directory ─────────────────────────────────────────────────────────

  fn get_user(
    &mut self,
    user_id: &str,
  ) -> std::result::Result<Option<User>, StoreError> {
    let user = self
      .tx
      .query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
        [user_id],
        user_from_row,
      )
      .optional()
      .map_err(crate::Error::from)?;
    Ok(user)
  }

  fn list_team_members(
    &mut self,
    team_name: &str,
  ) -> std::result::Result<Vec<User>, StoreError> {
    Ok(self.users_where("WHERE team_name = ?1", [team_name])?)
  }

  fn list_active_members(
    &mut self,
    team_name: &str,
  ) -> std::result::Result<Vec<User>, StoreError> {
    Ok(self.users_where("WHERE team_name = ?1 AND is_active = 1", [team_name])?)
  }

  fn list_users(&mut self) -> std::result::Result<Vec<User>, StoreError> {
    Ok(self.users_where("", [])?)
  }

  fn team_exists(
    &mut self,
    team_name: &str,
  ) -> std::result::Result<bool, StoreError> {
    let exists = self
      .tx
      .query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?1)",
        [team_name],
        |row| row.get(0),
      )
      .map_err(crate::Error::from)?;
    Ok(exists)
  }

  fn list_teams(&mut self) -> std::result::Result<Vec<String>, StoreError> {
    let run = || -> Result<Vec<String>> {
      let mut stmt = self
        .tx
        .prepare_cached("SELECT team_name FROM teams ORDER BY rowid")?;
      let teams = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
      Ok(teams)
    };
    Ok(run()?)
  }

  fn insert_team(
    &mut self,
    team_name: &str,
  ) -> std::result::Result<(), StoreError> {
    self
      .tx
      .execute("INSERT INTO teams (team_name) VALUES (?1)", [team_name])
      .map_err(crate::Error::from)?;
    Ok(())
  }

  fn upsert_user(&mut self, user: &User) -> std::result::Result<(), StoreError> {
    self
      .tx
      .execute(
        "INSERT INTO users (user_id, username, team_name, is_active)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (user_id) DO UPDATE SET
           username  = excluded.username,
           team_name = excluded.team_name,
           is_active = excluded.is_active",
        rusqlite::params![
          user.user_id,
          user.username,
          user.team_name,
          user.is_active
        ],
      )
      .map_err(crate::Error::from)?;
    Ok(())
  }

  fn set_user_active(
    &mut self,
    user_id: &str,
    active: bool,
  ) -> std::result::Result<bool, StoreError> {
    let changed = self
      .tx
      .execute(
        "UPDATE users SET is_active = ?1 WHERE user_id = ?2",
        rusqlite::params![active, user_id],
      )
      .map_err(crate::Error::from)?;
    Ok(changed > 0)
  }

  fn set_active_for_team(
    &mut self,
    team_name: &str,
    active: bool,
  ) -> std::result::Result<usize, StoreError> {
    let changed = self
      .tx
      .execute(
        "UPDATE users SET is_active = ?1 WHERE team_name = ?2",
        rusqlite::params![active, team_name],
      )
      .map_err(crate::Error::from)?;
    Ok(changed)
  }

  // ── Pull requests ─────────────────────────────────────────────────────

  fn pull_request_exists(
    &mut self,
    id: &str,
  ) -> std::result::Result<bool, StoreError> {
    let exists = self
      .tx
      .query_row(
        "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = ?1)",
        [id],
        |row| row.get(0),
      )
      .map_err(crate::Error::from)?;
    Ok(exists)
  }

  fn get_pull_request(
    &mut self,
    id: &str,
  ) -> std::result::Result<Option<PullRequest>, StoreError> {
    let mut found = self.pull_requests_where("WHERE pull_request_id = ?1", [id])?;
    Ok(found.pop())
  }

  fn insert_pull_request(
    &mut self,
    pr: &PullRequest,
  ) -> std::result::Result<(), StoreError> {
    let run = || -> Result<()> {
      self.tx.execute(
        "INSERT INTO pull_requests (
           pull_request_id, pull_request_name, author_id,
           status, created_at, merged_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
          pr.id,
          pr.name,
          pr.author_id,
          encode_status(pr.status),
          encode_dt(pr.created_at),
          pr.merged_at.map(encode_dt),
        ],
      )?;

      let mut stmt = self.tx.prepare_cached(
        "INSERT INTO pull_request_reviewers (pull_request_id, user_id)
         VALUES (?1, ?2)",
      )?;
      for reviewer in &pr.reviewers {
        stmt.execute([pr.id.as_str(), reviewer.as_str()])?;
      }
      Ok(())
    };
    Ok(run()?)
  }

  fn replace_reviewer(
    &mut self,
    pr_id: &str,
    old_reviewer: &str,
    new_reviewer: &str,
  ) -> std::result::Result<(), StoreError> {
    let changed = self
      .tx
      .execute(
        "UPDATE pull_request_reviewers SET user_id = ?1
         WHERE pull_request_id = ?2 AND user_id = ?3",
        [new_reviewer, pr_id, old_reviewer],
      )
      .map_err(crate::Error::from)?;

    if changed != 1 {
      return Err(StoreError::new(format!(
        "expected one reviewer edge ({pr_id}, {old_reviewer}), updated {changed}"
      )));
    }
    Ok(())
  }

  fn mark_merged(
    &mut self,
    pr_id: &str,
    merged_at: DateTime<Utc>,
  ) -> std::result::Result<(), StoreError> {
    self
      .tx
      .execute(
        "UPDATE pull_requests SET status = ?1, merged_at = ?2
         WHERE pull_request_id = ?3 AND status = ?4",
        [
          encode_status(PrStatus::Merged),
          encode_dt(merged_at),
          pr_id.to_owned(),
          encode_status(PrStatus::Open),
        ],
      )
      .map_err(crate::Error::from)?;
    Ok(())
  }

  fn list_pull_requests(
    &mut self,
  ) -> std::result::Result<Vec<PullRequest>, StoreError> {
    Ok(self.pull_requests_where("", [])?)
  }

  fn reviews_for_user(
    &mut self,
    user_id: &str,
  ) -> std::result::Result<Vec<PullRequestShort>, StoreError> {
    let run = || -> Result<Vec<PullRequestShort>> {
      let mut stmt = self.tx.prepare_cached(
        "SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id,
                pr.status, pr.created_at, pr.merged_at
         FROM pull_request_reviewers prr
         JOIN pull_requests pr ON pr.pull_request_id = prr.pull_request_id
         WHERE prr.user_id = ?1
         ORDER BY pr.rowid",
      )?;
      let raws = stmt
        .query_map([user_id], RawPullRequest::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawPullRequest::into_short).collect()
    };
    Ok(run()?)
  }

  fn open_pull_requests_for_team(
    &mut self,
    team_name: &str,
  ) -> std::result::Result<Vec<PullRequest>, StoreError> {
    Ok(self.pull_requests_where(
      "WHERE status = ?1
         AND (
           author_id IN (SELECT user_id FROM users WHERE team_name = ?2)
           OR pull_request_id IN (
             SELECT prr.pull_request_id
             FROM pull_request_reviewers prr
             JOIN users u ON u.user_id = prr.user_id
             WHERE u.team_name = ?2
           )
         )",
      [encode_status(PrStatus::Open), team_name.to_owned()],
    )?)
  }
}
