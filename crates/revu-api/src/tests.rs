//! Router tests over an in-memory engine.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use revu_core::{Engine, memory::InMemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

fn app() -> Router {
  api_router(Arc::new(Engine::new(InMemoryStore::new())))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn seed_team(app: &Router, name: &str, ids: &[&str]) {
  let members: Vec<Value> = ids
    .iter()
    .map(|id| json!({ "user_id": id, "username": id, "is_active": true }))
    .collect();
  let (status, _) = send(
    app,
    "POST",
    "/team/add",
    Some(json!({ "team_name": name, "members": members })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

async fn create_pr(app: &Router, id: &str, author: &str) -> (StatusCode, Value) {
  send(
    app,
    "POST",
    "/pullRequest/create",
    Some(json!({
      "pull_request_id": id,
      "pull_request_name": format!("change {id}"),
      "author_id": author,
    })),
  )
  .await
}

// ── Teams ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_team_then_get_it() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2"]).await;

  let (status, body) = send(&app, "GET", "/team/get?team_name=core", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["team_name"], "core");
  assert_eq!(body["members"][1]["user_id"], "u2");
}

#[tokio::test]
async fn duplicate_team_is_team_exists() {
  let app = app();
  seed_team(&app, "core", &["u1"]).await;

  let (status, body) = send(
    &app,
    "POST",
    "/team/add",
    Some(json!({ "team_name": "core", "members": [] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "TEAM_EXISTS");
}

#[tokio::test]
async fn unknown_team_is_not_found() {
  let app = app();
  let (status, body) = send(&app, "GET", "/team/get?team_name=ghosts", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn missing_query_and_bad_json_are_invalid_input() {
  let app = app();

  let (status, body) = send(&app, "GET", "/team/get", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "INVALID_INPUT");

  let req = Request::builder()
    .method("POST")
    .uri("/pullRequest/merge")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let (status, body) = send(
    &app,
    "POST",
    "/pullRequest/merge",
    Some(json!({ "pull_request_id": "  " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

// ── Pull requests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_pr_with_reviewers() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2", "u3"]).await;

  let (status, body) = create_pr(&app, "pr-1", "u1").await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["pr"]["pull_request_id"], "pr-1");
  assert_eq!(body["pr"]["status"], "OPEN");
  assert_eq!(body["pr"]["assigned_reviewers"], json!(["u2", "u3"]));
  assert!(body["pr"]["mergedAt"].is_null());

  let (status, body) = create_pr(&app, "pr-1", "u2").await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "PR_EXISTS");

  let (status, body) = create_pr(&app, "pr-2", "nobody").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn merge_twice_returns_same_timestamp() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2"]).await;
  create_pr(&app, "pr-1", "u1").await;

  let merge = json!({ "pull_request_id": "pr-1" });
  let (status, first) =
    send(&app, "POST", "/pullRequest/merge", Some(merge.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["pr"]["status"], "MERGED");

  let (_, second) = send(&app, "POST", "/pullRequest/merge", Some(merge)).await;
  assert_eq!(first["pr"]["mergedAt"], second["pr"]["mergedAt"]);

  let (status, body) = send(
    &app,
    "POST",
    "/pullRequest/reassign",
    Some(json!({ "pull_request_id": "pr-1", "old_user_id": "u2" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "PR_MERGED");
}

#[tokio::test]
async fn reassign_maps_outcomes() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2", "u3", "u4"]).await;
  create_pr(&app, "pr-1", "u1").await;

  let (status, body) = send(
    &app,
    "POST",
    "/pullRequest/reassign",
    Some(json!({ "pull_request_id": "pr-1", "old_user_id": "u2" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["replaced_by"], "u4");
  assert_eq!(body["pr"]["assigned_reviewers"], json!(["u4", "u3"]));

  let (status, body) = send(
    &app,
    "POST",
    "/pullRequest/reassign",
    Some(json!({ "pull_request_id": "pr-1", "old_user_id": "u1" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "NOT_ASSIGNED");

  let (status, body) = send(
    &app,
    "POST",
    "/pullRequest/reassign",
    Some(json!({ "pull_request_id": "pr-1", "old_user_id": "u3" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "NO_CANDIDATE");
}

// ── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_queue_and_activation() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2"]).await;
  create_pr(&app, "pr-1", "u1").await;

  let (status, body) =
    send(&app, "GET", "/users/getReview?user_id=u2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user_id"], "u2");
  assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr-1");

  let (status, body) = send(
    &app,
    "POST",
    "/users/setIsActive",
    Some(json!({ "user_id": "u2", "is_active": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["user"]["is_active"], false);
  assert_eq!(body["user"]["team_name"], "core");

  let (status, _) =
    send(&app, "GET", "/users/getReview?user_id=ghost", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Cascade and stats ────────────────────────────────────────────────────────

#[tokio::test]
async fn deactivate_team_reports_partial_failure() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2", "u3"]).await;
  create_pr(&app, "pr-1", "u1").await;

  let (status, body) = send(
    &app,
    "POST",
    "/team/deactivate",
    Some(json!({ "team_name": "core" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "PARTIAL_FAILURE");
  assert_eq!(body["reassigned"], json!([]));
  assert_eq!(body["failures"].as_array().unwrap().len(), 2);
  assert_eq!(body["failures"][0]["error"]["code"], "NO_CANDIDATE");
}

#[tokio::test]
async fn deactivate_team_without_open_prs_succeeds() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2"]).await;

  let (status, body) = send(
    &app,
    "POST",
    "/team/deactivate",
    Some(json!({ "team_name": "core" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "team deactivated and PR reviewers reassigned");

  let (status, _) = send(
    &app,
    "POST",
    "/team/deactivate",
    Some(json!({ "team_name": "ghosts" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_counts_everything() {
  let app = app();
  seed_team(&app, "core", &["u1", "u2", "u3"]).await;
  create_pr(&app, "pr-1", "u1").await;

  let (status, body) = send(&app, "GET", "/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["prs"]["total_pull_requests"], 1);
  assert_eq!(body["prs"]["prs_per_status"]["OPEN"], 1);
  assert_eq!(body["prs"]["prs_per_status"]["MERGED"], 0);
  assert_eq!(body["users"]["total_users"], 3);
  assert_eq!(body["teams"]["users_per_team"]["core"], 3);
}
