//! The 27 federative units of Brazil (26 states plus the Federal District).

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Two-letter code of a Brazilian federative unit.
///
/// Parsing is ASCII case-insensitive; display and serde use the uppercase
/// code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum StateCode {
  Ac,
  Al,
  Ap,
  Am,
  Ba,
  Ce,
  Df,
  Es,
  Go,
  Ma,
  Mt,
  Ms,
  Mg,
  Pa,
  Pb,
  Pr,
  Pe,
  Pi,
  Rj,
  Rn,
  Rs,
  Ro,
  Rr,
  Sc,
  Sp,
  Se,
  To,
}

impl StateCode {
  /// Portuguese display name.
  pub fn name(self) -> &'static str {
    match self {
      Self::Ac => "Acre",
      Self::Al => "Alagoas",
      Self::Ap => "Amapá",
      Self::Am => "Amazonas",
      Self::Ba => "Bahia",
      Self::Ce => "Ceará",
      Self::Df => "Distrito Federal",
      Self::Es => "Espírito Santo",
      Self::Go => "Goiás",
      Self::Ma => "Maranhão",
      Self::Mt => "Mato Grosso",
      Self::Ms => "Mato Grosso do Sul",
      Self::Mg => "Minas Gerais",
      Self::Pa => "Pará",
      Self::Pb => "Paraíba",
      Self::Pr => "Paraná",
      Self::Pe => "Pernambuco",
      Self::Pi => "Piauí",
      Self::Rj => "Rio de Janeiro",
      Self::Rn => "Rio Grande do Norte",
      Self::Rs => "Rio Grande do Sul",
      Self::Ro => "Rondônia",
      Self::Rr => "Roraima",
      Self::Sc => "Santa Catarina",
      Self::Sp => "São Paulo",
      Self::Se => "Sergipe",
      Self::To => "Tocantins",
    }
  }

  /// Look up a raw stored code. Returns `None` for codes outside the
  /// enumeration.
  pub fn lookup(code: &str) -> Option<Self> { code.parse().ok() }

  /// Display name for a raw stored code, falling back to the code itself.
  pub fn display_name(code: &str) -> &str {
    Self::lookup(code).map_or(code, |s| s.name())
  }
}
