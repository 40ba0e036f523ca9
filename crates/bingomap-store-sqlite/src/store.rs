//! [`SqliteStore`] — the SQLite implementation of the BingoMap store traits.

use std::path::Path;

use bingomap_core::{
  store::{CredentialStore, ViewerStore},
  user::{NewUser, User},
  viewer::{NewViewer, Viewer},
};
use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawUser, RawViewer, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A BingoMap store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run on the connection's own thread, so writes are serialised.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Current time at the precision the `created_at` columns keep.
fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── CredentialStore impl ────────────────────────────────────────────────────

impl CredentialStore for SqliteStore {
  type Error = Error;

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      id:            Uuid::new_v4(),
      email:         input.email,
      password_hash: input.password_hash,
      created_at:    now(),
    };

    let id_str = encode_uuid(user.id);
    let email  = user.email.clone();
    let hash   = user.password_hash.clone();
    let at_str = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO users (id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, email, hash, at_str],
        )?;
        Ok(changed == 1)
      })
      .await?;

    Ok(inserted.then_some(user))
  }

  async fn find_user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── ViewerStore impl ────────────────────────────────────────────────────────

impl ViewerStore for SqliteStore {
  type Error = Error;

  async fn add_viewer(&self, input: NewViewer) -> Result<Viewer> {
    let viewer = Viewer {
      id:          Uuid::new_v4(),
      state_code:  input.state_code,
      viewer_name: input.viewer_name,
      created_at:  now(),
    };

    let id_str = encode_uuid(viewer.id);
    let code   = viewer.state_code.clone();
    let name   = viewer.viewer_name.clone();
    let at_str = encode_dt(viewer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO state_viewers (id, state_code, viewer_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, code, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(viewer)
  }

  async fn list_viewers(&self) -> Result<Vec<Viewer>> {
    let raws: Vec<RawViewer> = self
      .conn
      .call(|conn| {
        // rowid breaks ties between rows created within the same microsecond.
        let mut stmt = conn.prepare(
          "SELECT id, state_code, viewer_name, created_at FROM state_viewers
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map([], RawViewer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawViewer::into_viewer).collect()
  }

  async fn delete_viewer(&self, id: Uuid) -> Result<Option<Viewer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawViewer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "DELETE FROM state_viewers WHERE id = ?1
             RETURNING id, state_code, viewer_name, created_at",
            rusqlite::params![id_str],
            RawViewer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawViewer::into_viewer).transpose()
  }
}
