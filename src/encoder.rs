//! Loading assets and encoding them as base64 data URIs.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};

use crate::fetch::{AssetFetcher, AssetLocation, FetchOutcome};
use crate::rules::is_remote;

/// Result of encoding one reference.
///
/// Only [`EncodingOutcome::Inlined`] causes a rewrite. The other variants all mean "leave the
/// reference as it is" and differ only in what they report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingOutcome {
  /// `data:<mime>;base64,<payload>` ready to substitute.
  Inlined(String),
  /// Asset exceeds the configured limit.
  Oversized {
    /// Observed size in bytes.
    size: u64,
  },
  /// Fetching failed; the message has already been logged.
  Failed(String),
}

impl EncodingOutcome {
  /// The data URI when the asset was inlined.
  pub fn data_uri(&self) -> Option<&str> {
    match self {
      Self::Inlined(uri) => Some(uri),
      Self::Oversized { .. } | Self::Failed(_) => None,
    }
  }
}

/// Resolve a reference against the file it appears in.
///
/// Remote URLs are kept verbatim. Local references drop any `?query` or `#fragment` suffix and
/// are joined onto the directory of `origin`; a leading `/` is treated as relative to that directory.
pub fn resolve_location(reference: &str, origin: &Path) -> AssetLocation {
  if is_remote(reference) {
    return AssetLocation::Remote(reference.to_string());
  }

  let path = reference.split(['?', '#']).next().unwrap_or(reference);
  let base = origin.parent().unwrap_or(Path::new(""));
  AssetLocation::Local(base.join(path.trim_start_matches('/')))
}

/// MIME type for a path, `application/octet-stream` when unknown.
pub fn mime_for_path(path: &Path) -> String {
  mime_guess::from_path(path)
    .first_or_octet_stream()
    .essence_str()
    .to_string()
}

/// Canonical `type/subtype;param=value` form of an announced content type.
///
/// Returns `None` when the header does not parse as a media type.
pub fn normalize_content_type(raw: &str) -> Option<String> {
  let mime: mime_guess::mime::Mime = raw.trim().parse().ok()?;
  let mut normalized = mime.essence_str().to_string();
  for (name, value) in mime.params() {
    normalized.push(';');
    normalized.push_str(name.as_str());
    normalized.push('=');
    normalized.push_str(value.as_str());
  }
  Some(normalized)
}

fn mime_for_location(location: &AssetLocation) -> String {
  match location {
    AssetLocation::Local(path) => mime_for_path(path),
    AssetLocation::Remote(url) => {
      let path = url.split(['?', '#']).next().unwrap_or(url);
      mime_for_path(Path::new(path))
    }
  }
}

/// Build `data:<mime>;base64,<payload>` with the standard alphabet and no line wrapping.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
  let encoded_len = base64::encoded_len(bytes.len(), true).unwrap_or(0);
  let mut uri = String::with_capacity(encoded_len + mime.len() + 13);
  uri.push_str("data:");
  uri.push_str(mime);
  uri.push_str(";base64,");
  general_purpose::STANDARD.encode_string(bytes, &mut uri);
  uri
}

/// Fetch and encode the asset behind `reference`.
///
/// Never fails: fetch errors are logged and returned as [`EncodingOutcome::Failed`], assets over
/// `limit` come back as [`EncodingOutcome::Oversized`]. A content type announced by the fetcher
/// takes precedence over the type guessed from the path.
pub async fn encode_reference<F>(
  fetcher: &F,
  reference: &str,
  origin: &Path,
  limit: Option<u64>,
) -> EncodingOutcome
where
  F: AssetFetcher + ?Sized,
{
  let location = resolve_location(reference, origin);

  let asset = match fetcher.fetch(&location, limit).await {
    Ok(FetchOutcome::Fetched(asset)) => asset,
    Ok(FetchOutcome::Oversized { size }) => {
      log::debug!("skipping {location}: {size} bytes exceeds the inline limit");
      return EncodingOutcome::Oversized { size };
    }
    Err(err) => {
      let message = err.to_string();
      log::error!("{message}");
      return EncodingOutcome::Failed(message);
    }
  };

  let size = asset.bytes.len() as u64;
  if let Some(limit) = limit
    && size > limit
  {
    log::debug!("skipping {location}: {size} bytes exceeds the inline limit of {limit}");
    return EncodingOutcome::Oversized { size };
  }

  let mime = asset
    .content_type
    .as_deref()
    .and_then(normalize_content_type)
    .unwrap_or_else(|| mime_for_location(&location));
  EncodingOutcome::Inlined(data_uri(&mime, &asset.bytes))
}
