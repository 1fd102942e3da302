//! Reviewer selection.
//!
//! Selection is a pure function of the roster: the first `limit` candidates
//! other than `exclude`, in roster order. Roster order is whatever stable
//! order the directory enumerates members in; no fairness or randomisation is
//! applied on top of it.

use crate::user::User;

/// Number of reviewers assigned when a pull request is created.
pub const INITIAL_REVIEWERS: usize = 2;

/// Pick up to `limit` reviewer ids from `candidates`, skipping `exclude`.
///
/// A short or empty result is not an error; the caller decides what "no
/// candidate" means.
pub fn select_reviewers(
  candidates: &[User],
  exclude: &str,
  limit: usize,
) -> Vec<String> {
  candidates
    .iter()
    .filter(|u| u.user_id != exclude)
    .take(limit)
    .map(|u| u.user_id.clone())
    .collect()
}
