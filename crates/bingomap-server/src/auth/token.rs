//! Signed, time-limited identity assertions (HS256 JWTs).
//!
//! Tokens are compact JWS strings: `header.payload.signature`, each part
//! base64url-encoded without padding, signed with HMAC-SHA256 over
//! `header.payload`. Only `{"alg":"HS256","typ":"JWT"}` headers are accepted.
//!
//! There is no server-side session state: a token stays valid until its
//! `exp`, even after the client logs out.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

/// Lifetime of an issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Signing key used when no secret is configured. Insecure.
pub const FALLBACK_SECRET: &str = "fallback-secret-do-not-use-in-production";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
  #[error("malformed token")]
  Malformed,
  #[error("signature mismatch")]
  BadSignature,
  #[error("token expired")]
  Expired,
  #[error("signing failed: {0}")]
  Signing(String),
}

/// The identity a valid token asserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub user_id: Uuid,
  pub email:   String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
  alg: String,
  typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
  user_id: Uuid,
  email:   String,
  /// Issued-at, Unix seconds.
  iat:     i64,
  /// Expiry, Unix seconds.
  exp:     i64,
}

/// Issues and verifies tokens with a process-wide secret.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct TokenService {
  secret:        Arc<[u8]>,
  uses_fallback: bool,
}

impl TokenService {
  pub fn new(secret: impl AsRef<[u8]>) -> Self {
    Self { secret: Arc::from(secret.as_ref()), uses_fallback: false }
  }

  /// Build from an optional configured secret. A missing or empty secret
  /// falls back to [`FALLBACK_SECRET`]; check [`uses_fallback`](Self::uses_fallback).
  pub fn from_config(secret: Option<&str>) -> Self {
    match secret.filter(|s| !s.is_empty()) {
      Some(s) => Self::new(s),
      None => Self { uses_fallback: true, ..Self::new(FALLBACK_SECRET) },
    }
  }

  /// Whether the insecure fallback secret is in use.
  pub fn uses_fallback(&self) -> bool { self.uses_fallback }

  pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
    self.issue_at(user_id, email, Utc::now())
  }

  /// Issue a token as if the current time were `now`.
  pub fn issue_at(
    &self,
    user_id: Uuid,
    email:   &str,
    now:     DateTime<Utc>,
  ) -> Result<String, TokenError> {
    let header = Header { alg: "HS256".to_string(), typ: "JWT".to_string() };
    let iat = now.timestamp();
    let claims = Claims {
      user_id,
      email: email.to_string(),
      iat,
      exp: iat + TOKEN_LIFETIME_SECS,
    };

    let header_json =
      serde_json::to_vec(&header).map_err(|e| TokenError::Signing(e.to_string()))?;
    let claims_json =
      serde_json::to_vec(&claims).map_err(|e| TokenError::Signing(e.to_string()))?;

    let signing_input =
      format!("{}.{}", B64URL.encode(header_json), B64URL.encode(claims_json));
    let signature = self.mac(&signing_input)?.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", B64URL.encode(signature)))
  }

  pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
    self.verify_at(token, Utc::now())
  }

  /// Verify a token as if the current time were `now`. A token is expired
  /// from the instant `now >= exp`.
  pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
      (parts.next(), parts.next(), parts.next(), parts.next())
    else {
      return Err(TokenError::Malformed);
    };

    let header: Header = decode_json(header_b64)?;
    if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
      return Err(TokenError::Malformed);
    }

    let signature = B64URL.decode(sig_b64).map_err(|_| TokenError::Malformed)?;
    self
      .mac(&format!("{header_b64}.{claims_b64}"))?
      .verify_slice(&signature)
      .map_err(|_| TokenError::BadSignature)?;

    let claims: Claims = decode_json(claims_b64)?;
    if now.timestamp() >= claims.exp {
      return Err(TokenError::Expired);
    }

    Ok(Identity { user_id: claims.user_id, email: claims.email })
  }

  fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
    let mut mac = HmacSha256::new_from_slice(&self.secret)
      .map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
  }
}

fn decode_json<T: serde::de::DeserializeOwned>(part: &str) -> Result<T, TokenError> {
  let raw = B64URL.decode(part).map_err(|_| TokenError::Malformed)?;
  serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)
}
