//! Client-side login state.
//!
//! A [`Session`] starts [`SessionState::Unknown`] and settles into
//! `Authenticated` or `Unauthenticated` once [`Session::initialize`] has
//! checked any stored token against the server.

use std::future::Future;

use anyhow::Result;
use bingomap_core::user::{LoginResponse, MIN_PASSWORD_LEN, UserInfo};

use crate::storage::{StoredSession, TokenStore};

/// Result of a credential check the server answered.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
  Accepted(LoginResponse),
  /// Bad credentials or missing fields, with the server's message.
  Rejected(String),
}

/// Result of an account creation the server answered.
#[derive(Debug, Clone)]
pub enum RegisterOutcome {
  Created(UserInfo),
  Rejected(String),
}

/// The auth endpoints a session talks to.
///
/// Expected failures come back as `Ok` outcomes; only transport errors and
/// unexpected statuses are `Err`.
pub trait AuthApi: Send + Sync {
  fn login(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = Result<LoginOutcome>> + Send;

  fn register(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = Result<RegisterOutcome>> + Send;

  /// `Ok(None)` when the server rejects the token.
  fn verify(&self, token: &str) -> impl Future<Output = Result<Option<UserInfo>>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
  /// Not yet checked against the server.
  Unknown,
  Authenticated(StoredSession),
  Unauthenticated,
}

/// What a screen that needs a logged-in user should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen<'a> {
  Loading,
  RedirectToLogin,
  Ready(&'a StoredSession),
}

pub struct Session<A, T> {
  api:   A,
  store: T,
  state: SessionState,
}

impl<A: AuthApi, T: TokenStore> Session<A, T> {
  pub fn new(api: A, store: T) -> Self {
    Self { api, store, state: SessionState::Unknown }
  }

  pub fn state(&self) -> &SessionState { &self.state }

  pub fn api(&self) -> &A { &self.api }

  /// Recover a stored token and check it with the server.
  ///
  /// A token the server rejects is cleared from storage. If the server cannot
  /// be reached the stored token is kept for a later attempt, but this run
  /// proceeds unauthenticated.
  pub async fn initialize(&mut self) -> Result<()> {
    let Some(stored) = self.store.load()? else {
      self.state = SessionState::Unauthenticated;
      return Ok(());
    };

    self.state = match self.api.verify(&stored.token).await {
      Ok(Some(user)) => {
        SessionState::Authenticated(StoredSession { token: stored.token, user })
      }
      Ok(None) => {
        tracing::debug!("stored token rejected; clearing");
        self.store.clear()?;
        SessionState::Unauthenticated
      }
      Err(e) => {
        tracing::warn!(error = %e, "could not verify stored token");
        SessionState::Unauthenticated
      }
    };
    Ok(())
  }

  /// Check credentials. On success the token and identity are stored.
  ///
  /// Returns the server's message when the credentials are refused. A
  /// refusal leaves both the state and the stored session as they were.
  pub async fn login(&mut self, email: &str, password: &str) -> Result<Result<UserInfo, String>> {
    match self.api.login(email, password).await? {
      LoginOutcome::Accepted(LoginResponse { token, user }) => {
        let session = StoredSession { token, user: user.clone() };
        self.store.save(&session)?;
        self.state = SessionState::Authenticated(session);
        Ok(Ok(user))
      }
      LoginOutcome::Rejected(message) => Ok(Err(message)),
    }
  }

  /// Forget the token. Always ends unauthenticated, even if storage fails.
  pub fn logout(&mut self) -> Result<()> {
    self.state = SessionState::Unauthenticated;
    self.store.clear()
  }

  /// Create an account. The session is left as it was; the new user must log
  /// in separately.
  pub async fn register(&self, email: &str, password: &str) -> Result<RegisterOutcome> {
    self.api.register(email, password).await
  }

  pub fn screen(&self) -> Screen<'_> {
    match &self.state {
      SessionState::Unknown => Screen::Loading,
      SessionState::Unauthenticated => Screen::RedirectToLogin,
      SessionState::Authenticated(s) => Screen::Ready(s),
    }
  }
}

/// Form checks run before a registration request is sent.
pub fn validate_registration(
  email: &str,
  password: &str,
  confirm: &str,
) -> Result<(), String> {
  if email.trim().is_empty() || password.is_empty() || confirm.is_empty() {
    return Err("Todos os campos são obrigatórios".to_string());
  }
  if password != confirm {
    return Err("As senhas não coincidem".to_string());
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(format!("A senha deve ter pelo menos {MIN_PASSWORD_LEN} caracteres"));
  }
  Ok(())
}
