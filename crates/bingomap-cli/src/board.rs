//! Local copy of the per-state viewer lists, kept in step with the server.
//!
//! Mutations are applied to the local copy first and then sent to the
//! server. A refusal or a failed request puts the copy back the way it was;
//! a success is followed by a refetch so server-assigned ids replace the
//! placeholders.

use std::future::Future;

use anyhow::Result;
use bingomap_core::{
  StateAggregate, rank,
  viewer::{NewViewer, Viewer, ViewerEntry},
};
use uuid::Uuid;

/// The viewer endpoints a board talks to.
pub trait ViewerApi: Send + Sync {
  fn list_viewers(&self) -> impl Future<Output = Result<Vec<StateAggregate>>> + Send;

  /// `Ok(None)` when the server refuses the viewer.
  fn add_viewer(
    &self,
    token: &str,
    input: &NewViewer,
  ) -> impl Future<Output = Result<Option<Viewer>>> + Send;

  /// `Ok(false)` when the server refuses or does not know the id.
  fn remove_viewer(&self, token: &str, id: Uuid) -> impl Future<Output = Result<bool>> + Send;
}

/// How a board mutation ended when the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
  Applied,
  /// Rolled back; the message is meant for the user.
  Refused(String),
}

pub struct ViewerBoard<A> {
  api:    A,
  states: Vec<StateAggregate>,
}

impl<A: ViewerApi> ViewerBoard<A> {
  pub fn new(api: A) -> Self { Self { api, states: Vec::new() } }

  pub fn states(&self) -> &[StateAggregate] { &self.states }

  /// Viewers attached to `state_code`, empty if none.
  pub fn viewers_in(&self, state_code: &str) -> &[ViewerEntry] {
    self
      .states
      .iter()
      .find(|s| s.state_code == state_code)
      .map(|s| s.viewers.as_slice())
      .unwrap_or_default()
  }

  pub fn ranking(&self) -> Vec<&StateAggregate> { rank(&self.states) }

  /// Replace the local copy with the server's.
  pub async fn refresh(&mut self) -> Result<()> {
    self.states = self.api.list_viewers().await?;
    tracing::debug!(states = self.states.len(), "viewer board refreshed");
    Ok(())
  }

  /// Add `viewer_name` under `state_code`.
  pub async fn add(
    &mut self,
    token: &str,
    state_code: &str,
    viewer_name: &str,
  ) -> Result<Mutation> {
    let viewer_name = viewer_name.trim();
    if viewer_name.is_empty() {
      return Ok(Mutation::Refused("O nome do viewer não pode estar vazio".to_string()));
    }

    let snapshot = self.states.clone();
    self.insert_local(state_code, ViewerEntry {
      id:          Uuid::new_v4(),
      viewer_name: viewer_name.to_string(),
    });

    let input = NewViewer {
      state_code:  state_code.to_string(),
      viewer_name: viewer_name.to_string(),
    };
    match self.api.add_viewer(token, &input).await {
      Ok(Some(viewer)) => {
        tracing::debug!(viewer_id = %viewer.id, "viewer added");
        self.settle().await;
        Ok(Mutation::Applied)
      }
      Ok(None) => {
        self.states = snapshot;
        Ok(Mutation::Refused("Não foi possível adicionar o viewer".to_string()))
      }
      Err(e) => {
        self.states = snapshot;
        Err(e)
      }
    }
  }

  /// Remove the viewer with `id`.
  pub async fn remove(&mut self, token: &str, id: Uuid) -> Result<Mutation> {
    let snapshot = self.states.clone();
    let Some(removed) = self.remove_local(id) else {
      return Ok(Mutation::Refused("Viewer não encontrado".to_string()));
    };

    match self.api.remove_viewer(token, id).await {
      Ok(true) => {
        self.settle().await;
        Ok(Mutation::Applied)
      }
      Ok(false) => {
        self.states = snapshot;
        Ok(Mutation::Refused(format!(
          "Não foi possível remover \"{}\"",
          removed.viewer_name
        )))
      }
      Err(e) => {
        self.states = snapshot;
        Err(e)
      }
    }
  }

  /// Refetch after a mutation the server accepted. A failed refetch keeps
  /// the optimistic copy.
  async fn settle(&mut self) {
    if let Err(e) = self.refresh().await {
      tracing::warn!(error = %e, "refetch after mutation failed");
    }
  }

  fn insert_local(&mut self, state_code: &str, entry: ViewerEntry) {
    match self.states.iter_mut().find(|s| s.state_code == state_code) {
      Some(state) => state.viewers.push(entry),
      None => self.states.push(StateAggregate {
        state_code: state_code.to_string(),
        viewers:    vec![entry],
      }),
    }
  }

  fn remove_local(&mut self, id: Uuid) -> Option<ViewerEntry> {
    let (slot, pos) = self.states.iter().enumerate().find_map(|(slot, state)| {
      state.viewers.iter().position(|v| v.id == id).map(|pos| (slot, pos))
    })?;
    let removed = self.states[slot].viewers.remove(pos);
    if self.states[slot].viewers.is_empty() {
      self.states.remove(slot);
    }
    Some(removed)
  }
}
