pub mod auth;
pub mod viewers;

/// A required string field: absent and empty are both missing.
pub(crate) fn present(field: Option<String>) -> Option<String> {
  field.filter(|s| !s.is_empty())
}
