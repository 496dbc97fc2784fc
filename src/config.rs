//! Inlining options, loadable from a JSON file and compiled into [`InlineRules`].

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::extensions::ExtensionList;
use crate::rules::{DEFAULT_LIMIT, InlineRules, MatchRule};

/// File name looked up by [`InlineOptions::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "dataurl.config.json";

/// A single include/exclude entry as written in the options file.
///
/// Strings are literal substrings; `{ "pattern": "..." }` objects are regular expressions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
  /// Case-sensitive substring.
  Literal(String),
  /// Regular expression, case folding controlled by its own `(?i)` flag.
  Pattern {
    /// Pattern source.
    pattern: String,
  },
}

impl RuleSpec {
  fn compile(&self) -> Result<MatchRule, ConfigError> {
    match self {
      Self::Literal(value) => Ok(MatchRule::literal(value.as_str())),
      Self::Pattern { pattern } => {
        MatchRule::pattern(pattern).map_err(|source| ConfigError::Pattern {
          pattern: pattern.clone(),
          source,
        })
      }
    }
  }
}

/// One entry or a list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleList {
  /// Single entry.
  One(RuleSpec),
  /// Several entries.
  Many(Vec<RuleSpec>),
}

impl RuleList {
  fn specs(&self) -> &[RuleSpec] {
    match self {
      Self::One(spec) => std::slice::from_ref(spec),
      Self::Many(specs) => specs,
    }
  }

  fn compile(&self) -> Result<Vec<MatchRule>, ConfigError> {
    self.specs().iter().map(RuleSpec::compile).collect()
  }
}

/// User facing options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InlineOptions {
  /// Allow `http(s)://` references.
  pub remote: bool,
  /// Allowed extensions, `"png,jpg"` or `["png", ".jpg"]`.
  pub extensions: Option<ExtensionList>,
  /// At least one entry must match.
  pub include: Option<RuleList>,
  /// No entry may match.
  pub exclude: Option<RuleList>,
  /// Size limit in bytes; defaults to 4096, `0` disables it.
  pub limit: Option<u64>,
}

impl InlineOptions {
  /// Load `dataurl.config.json` from `dir`, falling back to defaults when the file is missing.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.is_file() {
      return Ok(Self::default());
    }
    Self::from_path(&candidate)
  }

  /// Read options from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Normalise extensions and compile patterns into immutable rules.
  pub fn compile(&self) -> Result<InlineRules, ConfigError> {
    let mut rules = InlineRules::new()
      .with_remote(self.remote)
      .with_limit(Some(self.limit.unwrap_or(DEFAULT_LIMIT)));

    if let Some(extensions) = &self.extensions {
      rules = rules.with_extensions(extensions.clone());
    }
    if let Some(include) = &self.include {
      rules = rules.with_include(include.compile()?);
    }
    if let Some(exclude) = &self.exclude {
      rules = rules.with_exclude(exclude.compile()?);
    }

    Ok(rules)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn defaults_match_plugin_defaults() {
    let rules = InlineOptions::default().compile().unwrap();
    assert!(!rules.remote());
    assert!(rules.extensions().is_none());
    assert_eq!(rules.limit(), Some(4096));
    assert!(rules.is_eligible("anything.bin"));
  }

  #[test]
  fn parses_every_option_shape() {
    let options: InlineOptions = serde_json::from_str(
      r#"{
        "remote": true,
        "extensions": "png,jpg",
        "include": ["assets", { "pattern": "(?i)\\.PNG$" }],
        "exclude": "draft",
        "limit": 0
      }"#,
    )
    .unwrap();

    assert_eq!(options.include, Some(RuleList::Many(vec![
      RuleSpec::Literal("assets".into()),
      RuleSpec::Pattern {
        pattern: "(?i)\\.PNG$".into()
      },
    ])));

    let rules = options.compile().unwrap();
    assert!(rules.remote());
    assert_eq!(rules.extensions(), Some(&[".png".to_string(), ".jpg".to_string()][..]));
    assert_eq!(rules.limit(), None);
    assert!(rules.is_eligible("assets/logo.png"));
    assert!(!rules.is_eligible("assets/draft/logo.png"));
    assert!(!rules.is_eligible("static/logo.jpg"));
  }

  #[test]
  fn reports_invalid_patterns() {
    let options = InlineOptions {
      exclude: Some(RuleList::One(RuleSpec::Pattern {
        pattern: "(unclosed".into(),
      })),
      ..InlineOptions::default()
    };

    let error = options.compile().unwrap_err();
    assert!(matches!(error, ConfigError::Pattern { .. }));
    assert!(error.to_string().contains("(unclosed"));
  }

  #[test]
  fn discover_falls_back_to_defaults() {
    let temp = tempdir().expect("failed to create temp dir");
    let options = InlineOptions::discover(temp.path()).expect("missing file is not an error");
    assert!(options.extensions.is_none());
  }

  #[test]
  fn discover_reads_config_file() {
    let temp = tempdir().expect("failed to create temp dir");
    fs::write(
      temp.path().join(DEFAULT_CONFIG_FILE),
      r#"{"remote": true, "limit": 1024}"#,
    )
    .expect("failed to write config");

    let options = InlineOptions::discover(temp.path()).expect("config should load");
    assert!(options.remote);
    assert_eq!(options.limit, Some(1024));
  }

  #[test]
  fn surfaces_parse_errors() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, "{ not json").expect("failed to write config");

    let error = InlineOptions::from_path(&path).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
  }
}
