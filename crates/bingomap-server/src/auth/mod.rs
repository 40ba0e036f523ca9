//! Bearer-token auth gate and axum extractor.
//!
//! The gate only inspects headers; it never touches the store. Requests are
//! accepted iff they carry `Authorization: Bearer <token>` and the token
//! verifies.

pub mod password;
pub mod token;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use thiserror::Error;

use crate::{AppState, error::ApiError};
pub use token::{Identity, TokenError, TokenService};

/// Body message for rejected viewer mutations.
pub const UNAUTHORIZED: &str = "Unauthorized - Proper authentication token required";

/// Why a request was turned away by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("no Authorization header")]
  MissingHeader,
  #[error("Authorization header is not a Bearer credential")]
  WrongScheme,
  #[error("empty bearer token")]
  EmptyToken,
  #[error("invalid token: {0}")]
  Invalid(#[from] TokenError),
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
///
/// The token is the first space-separated segment after the prefix. Header
/// problems are reported without consulting any [`TokenService`].
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Rejection> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or(Rejection::MissingHeader)?
    .to_str()
    .map_err(|_| Rejection::WrongScheme)?;

  let rest = value.strip_prefix("Bearer ").ok_or(Rejection::WrongScheme)?;
  let token = rest.split_once(' ').map_or(rest, |(t, _)| t);

  if token.is_empty() {
    return Err(Rejection::EmptyToken);
  }
  Ok(token)
}

/// Decide whether a request is authenticated. Never panics; the caller maps
/// a rejection to `401`.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<Identity, Rejection> {
  let token = bearer_token(headers)?;
  Ok(tokens.verify(token)?)
}

/// Present in a handler's arguments means the request was authenticated.
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match authenticate(&parts.headers, &state.tokens) {
      Ok(identity) => Ok(Authenticated(identity)),
      Err(reason) => {
        tracing::debug!(%reason, path = %parts.uri.path(), "auth rejected");
        Err(ApiError::Unauthorized(UNAUTHORIZED.to_string()))
      }
    }
  }
}
