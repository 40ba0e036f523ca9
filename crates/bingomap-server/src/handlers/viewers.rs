//! Handlers for `/api/viewers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/viewers` | Public; viewers grouped per state |
//! | `POST`   | `/api/viewers` | Bearer token; body `{"stateCode","viewerName"}` |
//! | `DELETE` | `/api/viewers/:id` | Bearer token; 404 if absent |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use bingomap_core::{
  StateAggregate, StateCode, aggregate,
  store::ViewerStore,
  viewer::NewViewer,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::present;
use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/viewers`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<StateAggregate>>, ApiError>
where
  S: ViewerStore + 'static,
{
  let viewers = state.store.list_viewers().await.map_err(ApiError::internal)?;
  Ok(Json(aggregate(viewers)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub state_code:  Option<String>,
  pub viewer_name: Option<String>,
}

/// `POST /api/viewers` — body: `{"stateCode":"SP","viewerName":"Ana"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  payload: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ViewerStore + 'static,
{
  let Json(body) = payload?;
  let (Some(state_code), Some(viewer_name)) =
    (present(body.state_code), present(body.viewer_name))
  else {
    return Err(ApiError::BadRequest(
      "State code and viewer name are required".to_string(),
    ));
  };

  if StateCode::lookup(&state_code).is_none() {
    tracing::warn!(%state_code, "storing viewer under an unknown state code");
  }

  let viewer = state
    .store
    .add_viewer(NewViewer { state_code, viewer_name })
    .await
    .map_err(ApiError::internal)?;

  tracing::info!(
    viewer_id = %viewer.id,
    state_code = %viewer.state_code,
    user_id = %identity.user_id,
    "viewer added"
  );
  Ok((StatusCode::CREATED, Json(viewer)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/viewers/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(identity): Authenticated,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ViewerStore + 'static,
{
  if id.is_empty() {
    return Err(missing_id());
  }

  let not_found = || ApiError::NotFound("Viewer not found".to_string());

  // An id that is not a UUID cannot name a stored viewer.
  let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

  let viewer = state
    .store
    .delete_viewer(id)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(not_found)?;

  tracing::info!(viewer_id = %viewer.id, user_id = %identity.user_id, "viewer deleted");
  Ok(Json(json!({ "message": "Viewer deleted successfully" })))
}

/// `DELETE /api/viewers/` — the id segment is empty.
pub async fn delete_without_id<S>(
  State(_state): State<AppState<S>>,
  Authenticated(_): Authenticated,
) -> ApiError
where
  S: Send + Sync + 'static,
{
  missing_id()
}

fn missing_id() -> ApiError { ApiError::BadRequest("Viewer ID is required".to_string()) }
