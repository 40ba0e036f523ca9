//! Users and the public identity shape returned by the auth endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered account. Immutable once created.
#[derive(Debug, Clone)]
pub struct User {
  pub id:            Uuid,
  /// Unique, compared case-sensitively.
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`CredentialStore::create_user`](crate::store::CredentialStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub password_hash: String,
}

/// The `{id, email}` pair exposed to clients. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
  pub id:    Uuid,
  pub email: String,
}

impl From<&User> for UserInfo {
  fn from(user: &User) -> Self {
    Self { id: user.id, email: user.email.clone() }
  }
}

// ─── Auth payloads ────────────────────────────────────────────────────────────

/// Body of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

/// `200` body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  UserInfo,
}

/// `200` body of `GET /api/auth/verify` and `201` body of registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
  pub user: UserInfo,
}
