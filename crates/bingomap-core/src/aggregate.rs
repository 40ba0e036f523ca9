//! Per-state read model over the flat viewer table.
//!
//! The aggregate is computed on read and never stored. It feeds both the map
//! coloring ([`HeatLevel`]) and the ranking ([`rank`]).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::viewer::{Viewer, ViewerEntry};

/// Number of states shown in the ranking.
pub const RANKING_LIMIT: usize = 10;

/// All viewers attached to one state code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAggregate {
  pub state_code: String,
  pub viewers:    Vec<ViewerEntry>,
}

impl StateAggregate {
  pub fn count(&self) -> usize { self.viewers.len() }
}

/// Group viewer rows by state code in a single pass.
///
/// Aggregates come out in order of first appearance of their state code;
/// viewers within an aggregate keep input order. Codes are compared
/// verbatim, so `"sp"` and `"SP"` land in different aggregates.
pub fn aggregate(viewers: impl IntoIterator<Item = Viewer>) -> Vec<StateAggregate> {
  let mut index: HashMap<String, usize> = HashMap::new();
  let mut out: Vec<StateAggregate> = Vec::new();

  for viewer in viewers {
    let slot = match index.get(&viewer.state_code) {
      Some(&i) => i,
      None => {
        index.insert(viewer.state_code.clone(), out.len());
        out.push(StateAggregate {
          state_code: viewer.state_code.clone(),
          viewers:    Vec::new(),
        });
        out.len() - 1
      }
    };
    out[slot].viewers.push(viewer.into());
  }

  out
}

/// The top [`RANKING_LIMIT`] aggregates by viewer count, descending.
///
/// The sort is stable: equal counts keep their aggregation order.
pub fn rank(aggregates: &[StateAggregate]) -> Vec<&StateAggregate> {
  let mut ranked: Vec<&StateAggregate> = aggregates.iter().collect();
  ranked.sort_by(|a, b| b.count().cmp(&a.count()));
  ranked.truncate(RANKING_LIMIT);
  ranked
}

// ─── Map coloring ────────────────────────────────────────────────────────────

/// Fill intensity of a state on the map, bucketed by viewer count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeatLevel {
  None,
  Faint,
  Light,
  Medium,
  Bright,
  Strong,
}

impl HeatLevel {
  pub fn for_count(count: usize) -> Self {
    match count {
      0 => Self::None,
      1..=2 => Self::Faint,
      3..=5 => Self::Light,
      6..=9 => Self::Medium,
      10..=14 => Self::Bright,
      _ => Self::Strong,
    }
  }
}
