//! HTTP layer for BingoMap.
//!
//! Exposes an axum [`Router`] serving the JSON auth and viewer endpoints,
//! backed by any store implementing both
//! [`CredentialStore`] and [`ViewerStore`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use bingomap_core::store::{CredentialStore, ViewerStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::TokenService;
use handlers::{auth as auth_handlers, viewers};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BINGOMAP_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// HMAC key for issued tokens. Unset falls back to an insecure built-in.
  #[serde(default)]
  pub jwt_secret: Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("bingomap.db") }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenService>,
}

// Manual impl: cloning the `Arc`s must not require `S: Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), tokens: Arc::clone(&self.tokens) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the BingoMap API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CredentialStore + ViewerStore + 'static,
{
  Router::new()
    // Auth
    .route("/api/auth/register", post(auth_handlers::register::<S>))
    .route("/api/auth/login",    post(auth_handlers::login::<S>))
    .route("/api/auth/verify",   get(auth_handlers::verify::<S>))
    // Viewers
    .route("/api/viewers",       get(viewers::list::<S>).post(viewers::create::<S>))
    .route("/api/viewers/",      delete(viewers::delete_without_id::<S>))
    .route("/api/viewers/{id}",  delete(viewers::delete_one::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bingomap_store_sqlite::SqliteStore;
  use chrono::{Duration, Utc};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  const SECRET: &str = "integration-secret";

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      tokens: Arc::new(TokenService::new(SECRET)),
    }
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    bearer: Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = router(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
  }

  async fn register(state: &AppState<SqliteStore>, email: &str, password: &str) -> (StatusCode, Value) {
    send(state, "POST", "/api/auth/register", None, Some(json!({ "email": email, "password": password }))).await
  }

  async fn login(state: &AppState<SqliteStore>, email: &str, password: &str) -> (StatusCode, Value) {
    send(state, "POST", "/api/auth/login", None, Some(json!({ "email": email, "password": password }))).await
  }

  /// Register and log in a fresh user; returns the bearer token.
  async fn token_for(state: &AppState<SqliteStore>, email: &str) -> String {
    let (status, _) = register(state, email, "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = login(state, email, "secret123").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
  }

  async fn add(state: &AppState<SqliteStore>, token: &str, code: &str, name: &str) -> Value {
    let (status, body) = send(
      state,
      "POST",
      "/api/viewers",
      Some(token),
      Some(json!({ "stateCode": code, "viewerName": name })),
    ).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  // ── Register ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_201_with_user() {
    let state = make_state().await;
    let (status, body) = register(&state, "ana@example.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert!(body["user"]["id"].as_str().is_some());
    assert!(body.get("token").is_none());
  }

  #[tokio::test]
  async fn register_duplicate_email_conflicts() {
    let state = make_state().await;
    register(&state, "ana@example.com", "secret123").await;
    let (status, body) = register(&state, "ana@example.com", "another1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // The first password still works.
    let (status, _) = login(&state, "ana@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn register_rejects_missing_fields_and_short_passwords() {
    let state = make_state().await;
    let (status, _) = send(&state, "POST", "/api/auth/register", None, Some(json!({ "email": "a@b.c" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = register(&state, "a@b.c", "12345").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains('6'));
  }

  // ── Login ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_then_verify_returns_same_identity() {
    let state = make_state().await;
    let (_, reg) = register(&state, "ana@example.com", "secret123").await;
    let (status, body) = login(&state, "ana@example.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], reg["user"]);

    let token = body["token"].as_str().unwrap();
    let (status, verified) = send(&state, "GET", "/api/auth/verify", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["user"], reg["user"]);
  }

  #[tokio::test]
  async fn login_missing_fields_is_400() {
    let state = make_state().await;
    for body in [json!({}), json!({ "email": "a@b.c" }), json!({ "email": "", "password": "x" })] {
      let (status, resp) = send(&state, "POST", "/api/auth/login", None, Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(resp["error"], "Email and password are required");
    }
  }

  #[tokio::test]
  async fn login_malformed_json_is_400() {
    let state = make_state().await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/auth/login")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn login_bad_credentials_is_401() {
    let state = make_state().await;
    register(&state, "ana@example.com", "secret123").await;

    let (status, body) = login(&state, "ana@example.com", "wrong-pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = login(&state, "nobody@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
  }

  #[tokio::test]
  async fn login_email_is_case_sensitive() {
    let state = make_state().await;
    register(&state, "ana@example.com", "secret123").await;
    let (status, _) = login(&state, "ANA@example.com", "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Verify ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verify_without_header_is_401() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/api/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
  }

  #[tokio::test]
  async fn verify_expired_token_is_401() {
    let state = make_state().await;
    let stale = state
      .tokens
      .issue_at(Uuid::new_v4(), "a@b.c", Utc::now() - Duration::hours(25))
      .unwrap();
    let (status, body) = send(&state, "GET", "/api/auth/verify", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
  }

  #[tokio::test]
  async fn token_from_other_secret_is_401() {
    let state = make_state().await;
    let forged = TokenService::new("not-the-secret").issue(Uuid::new_v4(), "a@b.c").unwrap();
    let (status, _) = send(&state, "GET", "/api/auth/verify", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Viewers: list ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_is_public_and_empty_initially() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/api/viewers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
  }

  #[tokio::test]
  async fn list_groups_viewers_by_first_seen_state() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let a = add(&state, &token, "SP", "A").await;
    let b = add(&state, &token, "RJ", "B").await;
    let c = add(&state, &token, "SP", "C").await;

    let (status, body) = send(&state, "GET", "/api/viewers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    // Most recent first: C (SP), B (RJ), A (SP).
    assert_eq!(
      body,
      json!([
        { "stateCode": "SP", "viewers": [
          { "id": c["id"], "viewerName": "C" },
          { "id": a["id"], "viewerName": "A" }
        ]},
        { "stateCode": "RJ", "viewers": [
          { "id": b["id"], "viewerName": "B" }
        ]}
      ])
    );
  }

  // ── Viewers: create ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_returns_full_viewer() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let body = add(&state, &token, "MG", "Bia").await;
    assert_eq!(body["stateCode"], "MG");
    assert_eq!(body["viewerName"], "Bia");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert!(body["createdAt"].is_string());
  }

  #[tokio::test]
  async fn create_without_auth_is_401_and_store_unchanged() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/api/viewers",
      None,
      Some(json!({ "stateCode": "SP", "viewerName": "Sneaky" })),
    ).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], auth::UNAUTHORIZED);

    let (_, list) = send(&state, "GET", "/api/viewers", None, None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn create_with_invalid_token_is_401() {
    let state = make_state().await;
    let (status, _) = send(
      &state,
      "POST",
      "/api/viewers",
      Some("garbage"),
      Some(json!({ "stateCode": "SP", "viewerName": "X" })),
    ).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn create_missing_fields_is_400() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    for body in [json!({ "stateCode": "SP" }), json!({ "viewerName": "X" }), json!({ "stateCode": "", "viewerName": "X" })] {
      let (status, resp) = send(&state, "POST", "/api/viewers", Some(&token), Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(resp["error"], "State code and viewer name are required");
    }
  }

  #[tokio::test]
  async fn create_accepts_unknown_state_code_verbatim() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let body = add(&state, &token, "zz", "Nowhere").await;
    assert_eq!(body["stateCode"], "zz");
  }

  // ── Viewers: delete ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_existing_viewer_returns_message() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let v = add(&state, &token, "BA", "Caio").await;
    let uri = format!("/api/viewers/{}", v["id"].as_str().unwrap());

    let (status, body) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Viewer deleted successfully");

    let (_, list) = send(&state, "GET", "/api/viewers", None, None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn delete_unknown_viewer_is_404() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;

    let uri = format!("/api/viewers/{}", Uuid::new_v4());
    let (status, body) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Viewer not found");

    let (status, _) = send(&state, "DELETE", "/api/viewers/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn delete_without_id_is_400() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let (status, body) = send(&state, "DELETE", "/api/viewers/", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Viewer ID is required");
  }

  #[tokio::test]
  async fn delete_without_auth_is_401_and_viewer_kept() {
    let state = make_state().await;
    let token = token_for(&state, "ana@example.com").await;
    let v = add(&state, &token, "PE", "Duda").await;
    let uri = format!("/api/viewers/{}", v["id"].as_str().unwrap());

    let (status, _) = send(&state, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = send(&state, "GET", "/api/viewers", None, None).await;
    assert_eq!(list[0]["viewers"][0]["id"], v["id"]);
  }

  #[tokio::test]
  async fn any_users_token_may_delete_any_viewer() {
    let state = make_state().await;
    let ana = token_for(&state, "ana@example.com").await;
    let bia = token_for(&state, "bia@example.com").await;
    let v = add(&state, &ana, "SC", "Shared").await;
    let uri = format!("/api/viewers/{}", v["id"].as_str().unwrap());

    let (status, _) = send(&state, "DELETE", &uri, Some(&bia), None).await;
    assert_eq!(status, StatusCode::OK);
  }
}
