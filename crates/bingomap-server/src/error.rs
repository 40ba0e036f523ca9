//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the server as `{"error": "<message>"}`. Internal
//! failures are logged and answered with a fixed message.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn internal(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    ApiError::Internal(e.into())
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
