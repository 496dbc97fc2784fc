//! Eligibility rules deciding which references may be inlined.

use std::sync::OnceLock;

use regex::Regex;

use crate::extensions::{ExtensionList, normalize_extensions};

/// Size threshold applied when the caller does not configure one.
pub const DEFAULT_LIMIT: u64 = 4096;

fn remote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^https?://.+").expect("invalid remote URL regex"))
}

/// Returns `true` when the reference is an absolute `http(s)://` URL.
pub fn is_remote(reference: &str) -> bool {
    remote_pattern().is_match(reference)
}

/// Extension of the last path segment, including the leading dot.
///
/// Query and fragment suffixes are removed first. Dot files and names without a dot yield `""`.
pub fn file_extension(reference: &str) -> &str {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        None | Some(0) => "",
        Some(index) => &name[index..],
    }
}

/// A single include or exclude entry.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// Matches when the reference contains the text (case-sensitive).
    Literal(String),
    /// Matches when the regular expression finds a match anywhere in the reference.
    Pattern(Regex),
}

impl MatchRule {
    /// Literal substring rule.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// Compile a regular expression rule. Case folding follows the pattern's own `(?i)` flag.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Test the rule against a reference.
    pub fn matches(&self, reference: &str) -> bool {
        match self {
            Self::Literal(value) => reference.contains(value.as_str()),
            Self::Pattern(regex) => regex.is_match(reference),
        }
    }
}

impl From<Regex> for MatchRule {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl From<&str> for MatchRule {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

/// Immutable rule set shared by every document transform of a pipeline.
#[derive(Debug, Clone)]
pub struct InlineRules {
    remote: bool,
    extensions: Option<Vec<String>>,
    include: Option<Vec<MatchRule>>,
    exclude: Option<Vec<MatchRule>>,
    limit: Option<u64>,
}

impl Default for InlineRules {
    fn default() -> Self {
        Self {
            remote: false,
            extensions: None,
            include: None,
            exclude: None,
            limit: Some(DEFAULT_LIMIT),
        }
    }
}

impl InlineRules {
    /// Rules with remote references disabled, no filters and the default size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow or forbid `http(s)://` references.
    pub fn with_remote(mut self, remote: bool) -> Self {
        self.remote = remote;
        self
    }

    /// Restrict references to the given extensions. An empty filter disables the restriction.
    pub fn with_extensions(mut self, extensions: impl Into<ExtensionList>) -> Self {
        let normalized = normalize_extensions(extensions);
        self.extensions = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Require at least one of the rules to match. An empty list disables the requirement.
    pub fn with_include(mut self, rules: impl IntoIterator<Item = MatchRule>) -> Self {
        self.include = non_empty(rules);
        self
    }

    /// Reject references matched by any of the rules.
    pub fn with_exclude(mut self, rules: impl IntoIterator<Item = MatchRule>) -> Self {
        self.exclude = non_empty(rules);
        self
    }

    /// Maximum decoded asset size in bytes. `None` or `Some(0)` disables the limit.
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether remote references are eligible at all.
    pub fn remote(&self) -> bool {
        self.remote
    }

    /// Normalised extension filter, if any.
    pub fn extensions(&self) -> Option<&[String]> {
        self.extensions.as_deref()
    }

    /// Effective size limit; zero is reported as no limit.
    pub fn limit(&self) -> Option<u64> {
        self.limit.filter(|limit| *limit > 0)
    }

    /// Decide whether a reference qualifies for inlining.
    ///
    /// Checks run in order and the first failure rejects: empty reference, remote policy,
    /// extension filter, include rules, exclude rules. Exclusion therefore wins over inclusion.
    pub fn is_eligible(&self, reference: &str) -> bool {
        if reference.is_empty() {
            return false;
        }

        if !self.remote && is_remote(reference) {
            return false;
        }

        if let Some(extensions) = &self.extensions {
            let extension = file_extension(reference);
            if !extensions.iter().any(|allowed| allowed == extension) {
                return false;
            }
        }

        if let Some(include) = &self.include
            && !include.iter().any(|rule| rule.matches(reference))
        {
            return false;
        }

        if let Some(exclude) = &self.exclude
            && exclude.iter().any(|rule| rule.matches(reference))
        {
            return false;
        }

        true
    }
}

fn non_empty(rules: impl IntoIterator<Item = MatchRule>) -> Option<Vec<MatchRule>> {
    let rules: Vec<MatchRule> = rules.into_iter().collect();
    (!rules.is_empty()).then_some(rules)
}
