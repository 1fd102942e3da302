//! SQL schema for the Revu SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS teams (
    team_name TEXT PRIMARY KEY
);

-- rowid order is roster order; an upsert keeps the existing rowid.
CREATE TABLE IF NOT EXISTS users (
    user_id   TEXT PRIMARY KEY,
    username  TEXT NOT NULL,
    team_name TEXT NOT NULL REFERENCES teams(team_name),
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS pull_requests (
    pull_request_id   TEXT PRIMARY KEY,
    pull_request_name TEXT NOT NULL,
    author_id         TEXT NOT NULL REFERENCES users(user_id),
    status            TEXT NOT NULL DEFAULT 'OPEN'
                      CHECK (status IN ('OPEN', 'MERGED')),
    created_at        TEXT NOT NULL,   -- RFC 3339 UTC
    merged_at         TEXT,            -- RFC 3339 UTC; set iff MERGED
    CHECK ((status = 'MERGED') = (merged_at IS NOT NULL))
);

-- One row per reviewer assignment; rowid order is assignment order.
CREATE TABLE IF NOT EXISTS pull_request_reviewers (
    pull_request_id TEXT NOT NULL REFERENCES pull_requests(pull_request_id),
    user_id         TEXT NOT NULL REFERENCES users(user_id),
    PRIMARY KEY (pull_request_id, user_id)
);

CREATE INDEX IF NOT EXISTS users_team_idx      ON users(team_name);
CREATE INDEX IF NOT EXISTS prs_author_idx      ON pull_requests(author_id);
CREATE INDEX IF NOT EXISTS reviewers_user_idx  ON pull_request_reviewers(user_id);

PRAGMA user_version = 1;
";
