//! Error types surfaced by the inlining pipeline.
//!
//! Only fetch failures and configuration problems are modelled as errors. Rule rejections and
//! oversized assets are ordinary outcomes, see [`crate::encoder::EncodingOutcome`].

use std::path::PathBuf;

use thiserror::Error;

/// Failure of the fetch capability for a single asset.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Local file could not be read.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// File that could not be read.
    path: PathBuf,
    /// Underlying I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Remote request could not be completed.
  #[error("failed to fetch {url}: {source}")]
  Request {
    /// Requested URL.
    url: String,
    /// Underlying HTTP client error.
    #[source]
    source: reqwest::Error,
  },
  /// Remote server answered with a non-success status.
  #[error("failed to fetch {url}: server responded with {status}")]
  Status {
    /// Requested URL.
    url: String,
    /// Response status.
    status: reqwest::StatusCode,
  },
}

/// Problems loading or compiling inlining options.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Options file could not be read.
  #[error("failed to read {}: {source}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Options file is not valid JSON for [`crate::config::InlineOptions`].
  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// An include/exclude pattern is not a valid regular expression.
  #[error("invalid pattern `{pattern}`: {source}")]
  Pattern {
    /// Pattern text as written.
    pattern: String,
    /// Regex compilation error.
    #[source]
    source: regex::Error,
  },
}

/// Errors that abort the transform of a whole document.
#[derive(Debug, Error)]
pub enum InlineError {
  /// The document body is a stream rather than a buffer.
  #[error("{}: streaming not supported", .path.display())]
  StreamingNotSupported {
    /// Origin of the rejected document.
    path: PathBuf,
  },
}
