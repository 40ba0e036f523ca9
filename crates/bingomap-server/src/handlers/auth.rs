//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/register` | Body: `{"email","password"}`; 409 if taken |
//! | `POST` | `/api/auth/login` | Body: `{"email","password"}`; returns a token |
//! | `GET`  | `/api/auth/verify` | Bearer token; echoes the identity |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use bingomap_core::{
  store::CredentialStore,
  user::{LoginResponse, MIN_PASSWORD_LEN, NewUser, UserEnvelope, UserInfo},
};
use serde::Deserialize;

use super::present;
use crate::{
  AppState,
  auth::{Rejection, authenticate, password},
  error::ApiError,
};

/// Fields are optional so that a missing field is a validation error rather
/// than a JSON rejection.
#[derive(Debug, Deserialize)]
pub struct AuthBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

impl AuthBody {
  fn required(self) -> Result<(String, String), ApiError> {
    match (present(self.email), present(self.password)) {
      (Some(email), Some(password)) => Ok((email, password)),
      _ => Err(ApiError::BadRequest("Email and password are required".to_string())),
    }
  }
}

// ─── Register ─────────────────────────────────────────────────────────────────

/// `POST /api/auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<AuthBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredentialStore + 'static,
{
  let Json(body) = payload?;
  let (email, password) = body.required()?;

  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "Password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }

  let password_hash = password::hash_password(&password)
    .map_err(|e| ApiError::internal(format!("argon2 error: {e}")))?;

  let user = state
    .store
    .create_user(NewUser { email, password_hash })
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::Conflict("Email already registered".to_string()))?;

  tracing::info!(user_id = %user.id, "registered user");
  Ok((StatusCode::CREATED, Json(UserEnvelope { user: UserInfo::from(&user) })))
}

// ─── Login ────────────────────────────────────────────────────────────────────

/// `POST /api/auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<AuthBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: CredentialStore + 'static,
{
  let Json(body) = payload?;
  let (email, password) = body.required()?;

  let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

  let user = state
    .store
    .find_user_by_email(email)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(invalid)?;

  if !password::verify_password(&password, &user.password_hash) {
    tracing::debug!(user_id = %user.id, "password mismatch");
    return Err(invalid());
  }

  let token = state
    .tokens
    .issue(user.id, &user.email)
    .map_err(ApiError::internal)?;

  tracing::info!(user_id = %user.id, "user logged in");
  Ok(Json(LoginResponse { token, user: UserInfo::from(&user) }))
}

// ─── Verify ───────────────────────────────────────────────────────────────────

/// `GET /api/auth/verify`
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<Json<UserEnvelope>, ApiError>
where
  S: Send + Sync + 'static,
{
  match authenticate(&headers, &state.tokens) {
    Ok(identity) => Ok(Json(UserEnvelope {
      user: UserInfo { id: identity.user_id, email: identity.email },
    })),
    Err(reason @ Rejection::Invalid(_)) => {
      tracing::debug!(%reason, "token verification failed");
      Err(ApiError::Unauthorized("Invalid token".to_string()))
    }
    Err(reason) => {
      tracing::debug!(%reason, "token verification failed");
      Err(ApiError::Unauthorized("Unauthorized".to_string()))
    }
  }
}
