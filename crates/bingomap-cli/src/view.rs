//! Plain-text rendering of the map and the ranking.

use std::fmt::Write as _;

use bingomap_core::{HeatLevel, StateAggregate, StateCode, viewer::ViewerEntry};
use strum::IntoEnumIterator as _;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// One line per federative unit, in code order, followed by any stored codes
/// outside the enumeration.
pub fn render_map(states: &[StateAggregate]) -> String {
  let mut out = String::new();

  for code in StateCode::iter() {
    let viewers = states
      .iter()
      .find(|s| s.state_code == code.as_ref())
      .map(|s| s.viewers.as_slice())
      .unwrap_or_default();
    map_line(&mut out, code.as_ref(), code.name(), viewers);
  }

  let unknown: Vec<_> = states
    .iter()
    .filter(|s| StateCode::iter().all(|c| c.as_ref() != s.state_code))
    .collect();
  if !unknown.is_empty() {
    out.push_str("\nOutros códigos\n");
    for state in unknown {
      map_line(
        &mut out,
        &state.state_code,
        StateCode::display_name(&state.state_code),
        &state.viewers,
      );
    }
  }

  out
}

/// The top states by viewer count.
pub fn render_ranking(ranked: &[&StateAggregate]) -> String {
  if ranked.is_empty() {
    return "Nenhum viewer cadastrado ainda.\n".to_string();
  }

  let mut out = String::new();
  for (i, state) in ranked.iter().enumerate() {
    let _ = writeln!(
      out,
      "{:>2}. {} ({}): {}",
      i + 1,
      StateCode::display_name(&state.state_code),
      state.state_code,
      viewer_count(state.count()),
    );
  }
  out
}

/// Viewers of one state, with ids so they can be removed.
pub fn render_state(state_code: &str, viewers: &[ViewerEntry]) -> String {
  let mut out = format!(
    "{} ({})\n",
    StateCode::display_name(state_code),
    state_code
  );
  if viewers.is_empty() {
    out.push_str("  Nenhum viewer neste estado.\n");
  }
  for v in viewers {
    let _ = writeln!(out, "  {}  {}", v.id, v.viewer_name);
  }
  out
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn map_line(out: &mut String, code: &str, name: &str, viewers: &[ViewerEntry]) {
  let heat = HeatLevel::for_count(viewers.len());
  let names = viewers
    .iter()
    .map(|v| v.viewer_name.as_str())
    .collect::<Vec<_>>()
    .join(", ");
  let _ = writeln!(
    out,
    "{code:<3}{name:<22}{count:>4}  {glyph:<5}{names}",
    count = viewers.len(),
    glyph = heat_glyph(heat),
  );
}

fn heat_glyph(level: HeatLevel) -> &'static str {
  match level {
    HeatLevel::None => "·",
    HeatLevel::Faint => "░",
    HeatLevel::Light => "▒",
    HeatLevel::Medium => "▓",
    HeatLevel::Bright => "█",
    HeatLevel::Strong => "██",
  }
}

fn viewer_count(n: usize) -> String {
  if n == 1 { "1 viewer".to_string() } else { format!("{n} viewers") }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn state(code: &str, names: &[&str]) -> StateAggregate {
    StateAggregate {
      state_code: code.to_string(),
      viewers:    names
        .iter()
        .map(|n| ViewerEntry { id: Uuid::new_v4(), viewer_name: n.to_string() })
        .collect(),
    }
  }

  #[test]
  fn map_lists_every_unit() {
    let out = render_map(&[]);
    assert_eq!(out.lines().count(), 27);
    assert!(out.contains("São Paulo"));
    assert!(out.contains("Distrito Federal"));
  }

  #[test]
  fn map_shows_counts_and_names() {
    let out = render_map(&[state("SP", &["Ana", "Bia", "Caio"])]);
    let sp = out.lines().find(|l| l.starts_with("SP")).unwrap();
    assert!(sp.contains("   3"));
    assert!(sp.contains("▒"));
    assert!(sp.ends_with("Ana, Bia, Caio"));
  }

  #[test]
  fn map_appends_unknown_codes() {
    let out = render_map(&[state("sp", &["Ana"]), state("XX", &["Bia"])]);
    assert!(out.contains("Outros códigos"));
    // Lowercase codes are kept apart from the canonical row.
    let sp = out.lines().find(|l| l.starts_with("SP")).unwrap();
    assert!(sp.contains("   0"));
    assert!(out.lines().any(|l| l.starts_with("sp ") && l.contains("São Paulo")));
    assert!(out.lines().any(|l| l.starts_with("XX ") && l.ends_with("Bia")));
  }

  #[test]
  fn ranking_numbers_from_one() {
    let rj = state("RJ", &["A", "B"]);
    let sp = state("SP", &["C"]);
    let out = render_ranking(&[&rj, &sp]);
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines, [" 1. Rio de Janeiro (RJ): 2 viewers", " 2. São Paulo (SP): 1 viewer"]);
  }

  #[test]
  fn empty_ranking_has_placeholder() {
    assert_eq!(render_ranking(&[]), "Nenhum viewer cadastrado ainda.\n");
  }

  #[test]
  fn state_view_lists_ids() {
    let sp = state("SP", &["Ana"]);
    let out = render_state("SP", &sp.viewers);
    assert!(out.starts_with("São Paulo (SP)\n"));
    assert!(out.contains(&sp.viewers[0].id.to_string()));
  }
}
