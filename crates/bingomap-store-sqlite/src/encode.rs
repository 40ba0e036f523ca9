//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order matches chronological order. UUIDs are
//! stored as hyphenated lowercase strings.

use bingomap_core::{user::User, viewer::Viewer};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Rows ─────────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:            String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.id)?,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `state_viewers` row.
pub struct RawViewer {
  pub id:          String,
  pub state_code:  String,
  pub viewer_name: String,
  pub created_at:  String,
}

impl RawViewer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      state_code:  row.get(1)?,
      viewer_name: row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_viewer(self) -> Result<Viewer> {
    Ok(Viewer {
      id:          decode_uuid(&self.id)?,
      state_code:  self.state_code,
      viewer_name: self.viewer_name,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 1).unwrap();
    let b = a + chrono::Duration::milliseconds(500);
    let c = a + chrono::Duration::microseconds(1);
    let (ea, eb, ec) = (encode_dt(a), encode_dt(b), encode_dt(c));
    assert!(ea < ec && ec < eb, "{ea} {ec} {eb}");
    assert_eq!(ea.len(), eb.len());
  }

  #[test]
  fn datetime_survives_encoding() {
    let now = Utc::now();
    let back = decode_dt(&encode_dt(now)).unwrap();
    assert_eq!(back.timestamp_micros(), now.timestamp_micros());
  }

  #[test]
  fn bad_uuid_is_an_error() {
    assert!(matches!(decode_uuid("nope"), Err(Error::Uuid(_))));
  }
}
