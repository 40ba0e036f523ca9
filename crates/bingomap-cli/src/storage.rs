//! Persisted login session.
//!
//! The token and the user it was issued to are kept together in one JSON
//! file so that a later invocation can restore the session without logging in
//! again.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use bingomap_core::user::UserInfo;
use serde::{Deserialize, Serialize};

/// What survives between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
  pub token: String,
  pub user:  UserInfo,
}

/// Somewhere to keep a [`StoredSession`].
pub trait TokenStore {
  /// The stored session, or `None` if nothing usable is stored.
  fn load(&self) -> Result<Option<StoredSession>>;
  fn save(&self, session: &StoredSession) -> Result<()>;
  /// Remove the stored session. Clearing an empty store is not an error.
  fn clear(&self) -> Result<()>;
}

// ─── File ─────────────────────────────────────────────────────────────────────

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
  path: PathBuf,
}

impl FileTokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }
}

impl TokenStore for FileTokenStore {
  fn load(&self) -> Result<Option<StoredSession>> {
    let raw = match std::fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(e).with_context(|| format!("reading {}", self.path.display()));
      }
    };

    match serde_json::from_str(&raw) {
      Ok(session) => Ok(Some(session)),
      Err(e) => {
        tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
        Ok(None)
      }
    }
  }

  fn save(&self, session: &StoredSession) -> Result<()> {
    if let Some(dir) = self.path.parent()
      && !dir.as_os_str().is_empty()
    {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    }
    let raw = serde_json::to_string_pretty(session).context("serialising session")?;
    write_private(&self.path, raw.as_bytes())
      .with_context(|| format!("writing {}", self.path.display()))
  }

  fn clear(&self) -> Result<()> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
    }
  }
}

/// Write `contents` readable by the owner only. A file left behind with wider
/// permissions is tightened as well.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
  use std::{
    fs::{OpenOptions, Permissions},
    io::Write as _,
    os::unix::fs::{OpenOptionsExt as _, PermissionsExt as _},
  };

  let mut file = OpenOptions::new()
    .write(true)
    .create(true)
    .truncate(true)
    .mode(0o600)
    .open(path)?;
  file.set_permissions(Permissions::from_mode(0o600))?;
  file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
  std::fs::write(path, contents)
}

// ─── Memory ───────────────────────────────────────────────────────────────────

/// Process-local store. Nothing outlives the process.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
  slot: std::sync::Mutex<Option<StoredSession>>,
}

#[cfg(test)]
impl MemoryTokenStore {
  pub fn with(session: StoredSession) -> Self {
    Self { slot: std::sync::Mutex::new(Some(session)) }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Option<StoredSession>> {
    self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
  fn load(&self) -> Result<Option<StoredSession>> { Ok(self.lock().clone()) }

  fn save(&self, session: &StoredSession) -> Result<()> {
    *self.lock() = Some(session.clone());
    Ok(())
  }

  fn clear(&self) -> Result<()> {
    *self.lock() = None;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn session() -> StoredSession {
    StoredSession {
      token: "header.payload.sig".to_string(),
      user:  UserInfo { id: Uuid::new_v4(), email: "ana@example.com".to_string() },
    }
  }

  fn scratch_path() -> PathBuf {
    std::env::temp_dir()
      .join(format!("bingomap-test-{}", Uuid::new_v4()))
      .join("session.json")
  }

  #[test]
  fn file_store_save_then_load() {
    let store = FileTokenStore::new(scratch_path());
    let s = session();
    store.save(&s).unwrap();
    assert_eq!(store.load().unwrap(), Some(s));
    store.clear().unwrap();
  }

  #[cfg(unix)]
  #[test]
  fn session_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt as _;

    let path = scratch_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{}").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let store = FileTokenStore::new(&path);
    store.save(&session()).unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    store.clear().unwrap();
  }

  #[test]
  fn missing_file_loads_as_none() {
    let store = FileTokenStore::new(scratch_path());
    assert_eq!(store.load().unwrap(), None);
  }

  #[test]
  fn corrupt_file_loads_as_none() {
    let path = scratch_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{not json").unwrap();

    let store = FileTokenStore::new(&path);
    assert_eq!(store.load().unwrap(), None);
    store.clear().unwrap();
  }

  #[test]
  fn clear_removes_file_and_is_idempotent() {
    let store = FileTokenStore::new(scratch_path());
    store.save(&session()).unwrap();
    store.clear().unwrap();
    assert!(!store.path().exists());
    store.clear().unwrap();
  }

  #[test]
  fn memory_store_round() {
    let store = MemoryTokenStore::default();
    assert_eq!(store.load().unwrap(), None);
    store.save(&session()).unwrap();
    assert!(store.load().unwrap().is_some());
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
  }
}
