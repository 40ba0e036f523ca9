//! Async HTTP client wrapping the BingoMap JSON API.

use anyhow::{Context, Result, anyhow};
use bingomap_core::{
  StateAggregate,
  user::{Credentials, LoginResponse, UserEnvelope, UserInfo},
  viewer::{NewViewer, Viewer},
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::{
  board::ViewerApi,
  session::{AuthApi, LoginOutcome, RegisterOutcome},
};

/// Async HTTP client for the BingoMap REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  fn credentials(email: &str, password: &str) -> Credentials {
    Credentials { email: email.to_string(), password: password.to_string() }
  }
}

/// Statuses the server uses for failures the user can act on.
fn is_expected_failure(status: StatusCode) -> bool {
  matches!(
    status,
    StatusCode::BAD_REQUEST
      | StatusCode::UNAUTHORIZED
      | StatusCode::NOT_FOUND
      | StatusCode::CONFLICT
  )
}

/// The `{"error"}` message of a failed response, or its status line.
async fn error_message(resp: Response) -> String {
  let status = resp.status();
  match resp.json::<ErrorBody>().await {
    Ok(body) => body.error,
    Err(_) => status.to_string(),
  }
}

// ── Auth ──────────────────────────────────────────────────────────────────────

impl AuthApi for ApiClient {
  /// `POST /api/auth/login`
  async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&Self::credentials(email, password))
      .send()
      .await
      .context("POST /auth/login failed")?;

    let status = resp.status();
    if status.is_success() {
      let body: LoginResponse = resp.json().await.context("deserialising login response")?;
      return Ok(LoginOutcome::Accepted(body));
    }
    if is_expected_failure(status) {
      return Ok(LoginOutcome::Rejected(error_message(resp).await));
    }
    Err(anyhow!("POST /auth/login → {status}"))
  }

  /// `POST /api/auth/register`
  async fn register(&self, email: &str, password: &str) -> Result<RegisterOutcome> {
    let resp = self
      .client
      .post(self.url("/auth/register"))
      .json(&Self::credentials(email, password))
      .send()
      .await
      .context("POST /auth/register failed")?;

    let status = resp.status();
    if status.is_success() {
      let body: UserEnvelope = resp.json().await.context("deserialising registration")?;
      return Ok(RegisterOutcome::Created(body.user));
    }
    if is_expected_failure(status) {
      return Ok(RegisterOutcome::Rejected(error_message(resp).await));
    }
    Err(anyhow!("POST /auth/register → {status}"))
  }

  /// `GET /api/auth/verify`
  async fn verify(&self, token: &str) -> Result<Option<UserInfo>> {
    let resp = self
      .client
      .get(self.url("/auth/verify"))
      .bearer_auth(token)
      .send()
      .await
      .context("GET /auth/verify failed")?;

    match resp.status() {
      s if s.is_success() => {
        let body: UserEnvelope = resp.json().await.context("deserialising identity")?;
        Ok(Some(body.user))
      }
      StatusCode::UNAUTHORIZED => Ok(None),
      s => Err(anyhow!("GET /auth/verify → {s}")),
    }
  }
}

// ── Viewers ───────────────────────────────────────────────────────────────────

impl ViewerApi for ApiClient {
  /// `GET /api/viewers`
  async fn list_viewers(&self) -> Result<Vec<StateAggregate>> {
    let resp = self
      .client
      .get(self.url("/viewers"))
      .send()
      .await
      .context("GET /viewers failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /viewers → {}", resp.status()));
    }
    resp.json().await.context("deserialising viewers")
  }

  /// `POST /api/viewers`
  async fn add_viewer(&self, token: &str, input: &NewViewer) -> Result<Option<Viewer>> {
    let resp = self
      .client
      .post(self.url("/viewers"))
      .bearer_auth(token)
      .json(input)
      .send()
      .await
      .context("POST /viewers failed")?;

    let status = resp.status();
    if status.is_success() {
      return Ok(Some(resp.json().await.context("deserialising viewer")?));
    }
    if is_expected_failure(status) {
      let message = error_message(resp).await;
      tracing::debug!(%status, error = %message, "add viewer refused");
      return Ok(None);
    }
    Err(anyhow!("POST /viewers → {status}"))
  }

  /// `DELETE /api/viewers/:id`
  async fn remove_viewer(&self, token: &str, id: Uuid) -> Result<bool> {
    let resp = self
      .client
      .delete(self.url(&format!("/viewers/{id}")))
      .bearer_auth(token)
      .send()
      .await
      .with_context(|| format!("DELETE /viewers/{id} failed"))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(true);
    }
    if is_expected_failure(status) {
      let message = error_message(resp).await;
      tracing::debug!(%status, error = %message, "remove viewer refused");
      return Ok(false);
    }
    Err(anyhow!("DELETE /viewers/{id} → {status}"))
  }
}
