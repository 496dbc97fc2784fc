//! Byte fetching for local files and remote URLs.
//!
//! The encoder only talks to the [`AssetFetcher`] trait so callers can plug in their own source
//! of bytes. [`DefaultFetcher`] reads local paths with `tokio::fs` and remote URLs with `reqwest`.
//!
//! Fetchers receive the active size limit and may stop early once an asset is known to exceed it,
//! reporting [`FetchOutcome::Oversized`] instead of buffering the whole body.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::FetchError;

/// Upper bound on the buffer reserved up front from an announced `Content-Length`.
const MAX_PREALLOCATION: u64 = 64 * 1024;

/// Resolved location of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetLocation {
  /// Absolute or document-relative filesystem path after resolution.
  Local(PathBuf),
  /// Absolute `http(s)://` URL, used verbatim.
  Remote(String),
}

impl fmt::Display for AssetLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Local(path) => write!(f, "{}", path.display()),
      Self::Remote(url) => f.write_str(url),
    }
  }
}

/// Bytes of an asset plus the content type reported by its source, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedAsset {
  /// Raw asset body.
  pub bytes: Vec<u8>,
  /// Content type announced by the source (remote responses only).
  pub content_type: Option<String>,
}

impl FetchedAsset {
  /// Asset without an announced content type.
  pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      bytes: bytes.into(),
      content_type: None,
    }
  }

  /// Attach an announced content type.
  pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
    self.content_type = Some(content_type.into());
    self
  }
}

/// Successful fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// Full asset body.
  Fetched(FetchedAsset),
  /// The asset is known to exceed the limit; `size` is the byte count observed so far.
  Oversized {
    /// Known or partially read size in bytes.
    size: u64,
  },
}

/// Source of asset bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
  /// Fetch the asset at `location`. `limit` is advisory: implementations may report
  /// [`FetchOutcome::Oversized`] early, or return the full body and leave the check to the caller.
  async fn fetch(
    &self,
    location: &AssetLocation,
    limit: Option<u64>,
  ) -> Result<FetchOutcome, FetchError>;
}

/// Reads local files through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl FsFetcher {
  /// Read a file, checking its metadata length against `limit` before reading.
  pub async fn read(&self, path: &Path, limit: Option<u64>) -> Result<FetchOutcome, FetchError> {
    let io_error = |source: std::io::Error| FetchError::Io {
      path: path.to_path_buf(),
      source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
    if let Some(limit) = limit
      && metadata.len() > limit
    {
      return Ok(FetchOutcome::Oversized {
        size: metadata.len(),
      });
    }

    let bytes = tokio::fs::read(path).await.map_err(io_error)?;
    Ok(FetchOutcome::Fetched(FetchedAsset::new(bytes)))
  }
}

/// Downloads remote assets with `reqwest`, streaming the body so oversized responses stop early.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: Client,
  timeout: Option<Duration>,
}

impl Default for HttpFetcher {
  fn default() -> Self {
    Self::with_client(Client::new())
  }
}

impl HttpFetcher {
  /// Fetcher backed by an existing client.
  pub fn with_client(client: Client) -> Self {
    Self {
      client,
      timeout: None,
    }
  }

  /// Apply a per-request timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  /// GET `url` and collect its body unless it exceeds `limit`.
  pub async fn get(&self, url: &str, limit: Option<u64>) -> Result<FetchOutcome, FetchError> {
    let request_error = |source: reqwest::Error| FetchError::Request {
      url: url.to_string(),
      source,
    };

    let mut request = self.client.get(url);
    if let Some(timeout) = self.timeout {
      request = request.timeout(timeout);
    }
    let response = request.send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status,
      });
    }

    let content_type = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|value| value.to_str().ok())
      .map(str::to_string);

    let expected_size = response.content_length();
    if let (Some(limit), Some(size)) = (limit, expected_size)
      && size > limit
    {
      return Ok(FetchOutcome::Oversized { size });
    }

    let capacity = expected_size.map_or(0, |size| size.min(MAX_PREALLOCATION));
    let mut buffer = Vec::with_capacity(capacity as usize);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
      let chunk = chunk.map_err(request_error)?;
      let total = (buffer.len() + chunk.len()) as u64;
      if let Some(limit) = limit
        && total > limit
      {
        return Ok(FetchOutcome::Oversized { size: total });
      }
      buffer.extend_from_slice(&chunk);
    }

    Ok(FetchOutcome::Fetched(FetchedAsset {
      bytes: buffer,
      content_type,
    }))
  }
}

/// Dispatches local locations to [`FsFetcher`] and remote ones to [`HttpFetcher`].
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
  fs: FsFetcher,
  http: HttpFetcher,
}

impl DefaultFetcher {
  /// Default fetcher using the given HTTP fetcher for remote assets.
  pub fn with_http(http: HttpFetcher) -> Self {
    Self { fs: FsFetcher, http }
  }
}

#[async_trait]
impl AssetFetcher for DefaultFetcher {
  async fn fetch(
    &self,
    location: &AssetLocation,
    limit: Option<u64>,
  ) -> Result<FetchOutcome, FetchError> {
    match location {
      AssetLocation::Local(path) => self.fs.read(path, limit).await,
      AssetLocation::Remote(url) => self.http.get(url, limit).await,
    }
  }
}
