//! Storage traits for the two persisted resources.
//!
//! Implemented by storage backends (e.g. `bingomap-store-sqlite`). The
//! server depends on these abstractions, not on a concrete backend.
//!
//! All methods return `Send` futures so the traits can be used from
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  user::{NewUser, User},
  viewer::{NewViewer, Viewer},
};

/// Users keyed by unique email.
pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new user. Returns `None` if the email is already registered;
  /// the existing account is left untouched.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Exact, case-sensitive lookup by email.
  fn find_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}

/// Viewer rows attached to states.
pub trait ViewerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a viewer. The id and `created_at` are assigned by the store.
  fn add_viewer(
    &self,
    input: NewViewer,
  ) -> impl Future<Output = Result<Viewer, Self::Error>> + Send + '_;

  /// All viewers, most recently created first.
  fn list_viewers(
    &self,
  ) -> impl Future<Output = Result<Vec<Viewer>, Self::Error>> + Send + '_;

  /// Delete a viewer by id, returning the removed row, or `None` if no such
  /// viewer existed.
  fn delete_viewer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Viewer>, Self::Error>> + Send + '_;
}
