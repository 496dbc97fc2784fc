//! Normalisation of user supplied extension filters.

use serde::Deserialize;

/// Extension filter as written by the user: a single (optionally comma separated) string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExtensionList {
  /// `"png"` or `"jpg,png"`.
  One(String),
  /// `["jpg", ".png"]`.
  Many(Vec<String>),
}

impl From<&str> for ExtensionList {
  fn from(value: &str) -> Self {
    Self::One(value.to_string())
  }
}

impl From<String> for ExtensionList {
  fn from(value: String) -> Self {
    Self::One(value)
  }
}

impl From<Vec<String>> for ExtensionList {
  fn from(values: Vec<String>) -> Self {
    Self::Many(values)
  }
}

impl From<&[&str]> for ExtensionList {
  fn from(values: &[&str]) -> Self {
    Self::Many(values.iter().map(|value| value.to_string()).collect())
  }
}

impl<const N: usize> From<[&str; N]> for ExtensionList {
  fn from(values: [&str; N]) -> Self {
    Self::from(values.as_slice())
  }
}

/// Convert an extension filter into a list of dot-prefixed suffixes.
///
/// A single string is split on commas first; every element is then prefixed with `.` unless it
/// already starts with one. Blank elements are dropped, so empty input yields an empty list.
pub fn normalize_extensions(extensions: impl Into<ExtensionList>) -> Vec<String> {
  let raw = match extensions.into() {
    ExtensionList::One(value) => value.split(',').map(str::to_string).collect(),
    ExtensionList::Many(values) => values,
  };

  raw
    .iter()
    .map(|value| value.trim())
    .filter(|value| !value.is_empty())
    .map(dot_prefixed)
    .collect()
}

fn dot_prefixed(extension: &str) -> String {
  if extension.starts_with('.') {
    extension.to_string()
  } else {
    format!(".{extension}")
  }
}
