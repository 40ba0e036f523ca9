//! Viewers — named entries attached to a state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted viewer row. Created and deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewer {
  pub id:          Uuid,
  /// Stored verbatim; see [`StateCode`](crate::StateCode) for the known set.
  pub state_code:  String,
  pub viewer_name: String,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`ViewerStore::add_viewer`](crate::store::ViewerStore::add_viewer)
/// and body of `POST /api/viewers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewViewer {
  pub state_code:  String,
  pub viewer_name: String,
}

/// The slim `{id, viewerName}` form listed inside a
/// [`StateAggregate`](crate::StateAggregate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerEntry {
  pub id:          Uuid,
  pub viewer_name: String,
}

impl From<Viewer> for ViewerEntry {
  fn from(v: Viewer) -> Self {
    Self { id: v.id, viewer_name: v.viewer_name }
  }
}
