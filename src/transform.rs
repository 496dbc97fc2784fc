//! Per-document orchestration: extract, validate, encode and rewrite.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;

use crate::document::{Document, DocumentContents};
use crate::encoder::{EncodingOutcome, encode_reference};
use crate::error::InlineError;
use crate::fetch::{AssetFetcher, DefaultFetcher};
use crate::references::extract_references;
use crate::rules::InlineRules;

/// Terminal state of a reference within one document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheEntry {
  Rejected,
  Encoded(EncodingOutcome),
}

impl CacheEntry {
  fn data_uri(&self) -> Option<&str> {
    match self {
      Self::Rejected => None,
      Self::Encoded(outcome) => outcome.data_uri(),
    }
  }
}

/// Results keyed by the exact reference text, owned by a single transform call.
#[derive(Debug, Default)]
struct DocumentCache {
  entries: HashMap<String, CacheEntry>,
}

/// What happened to the references of one document.
///
/// Counters are per distinct reference string; `replacements` counts rewritten occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
  /// References replaced by a data URI.
  pub inlined: usize,
  /// References rejected by the rules.
  pub rejected: usize,
  /// References whose asset exceeded the size limit.
  pub oversized: usize,
  /// References whose asset could not be fetched, with the logged message.
  pub failures: Vec<(String, String)>,
  /// Occurrences rewritten in the text.
  pub replacements: usize,
  /// Document-level failure that stopped processing, if any.
  pub document_error: Option<String>,
}

impl TransformReport {
  /// Number of distinct references evaluated.
  pub fn total(&self) -> usize {
    self.inlined + self.rejected + self.oversized + self.failures.len()
  }

  fn record(&mut self, reference: &str, entry: &CacheEntry) {
    match entry {
      CacheEntry::Rejected => self.rejected += 1,
      CacheEntry::Encoded(EncodingOutcome::Inlined(_)) => self.inlined += 1,
      CacheEntry::Encoded(EncodingOutcome::Oversized { .. }) => self.oversized += 1,
      CacheEntry::Encoded(EncodingOutcome::Failed(message)) => {
        self.failures.push((reference.to_string(), message.clone()));
      }
    }
  }
}

/// Rewritten text plus the report describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
  /// Document text after substitutions.
  pub content: String,
  /// Per-reference accounting.
  pub report: TransformReport,
}

/// Inlines eligible asset references as data URIs.
///
/// Holds the read-only rules and the fetcher; every transform call creates its own cache, so a
/// single inliner can process many documents concurrently.
pub struct Inliner<F = DefaultFetcher> {
  rules: Arc<InlineRules>,
  fetcher: Arc<F>,
}

impl<F> Clone for Inliner<F> {
  fn clone(&self) -> Self {
    Self {
      rules: Arc::clone(&self.rules),
      fetcher: Arc::clone(&self.fetcher),
    }
  }
}

impl Inliner<DefaultFetcher> {
  /// Inliner reading local files from disk and remote assets over HTTP.
  pub fn with_default_fetcher(rules: InlineRules) -> Self {
    Self::new(rules, DefaultFetcher::default())
  }
}

impl<F: AssetFetcher> Inliner<F> {
  /// Inliner using a custom fetcher.
  pub fn new(rules: InlineRules, fetcher: F) -> Self {
    Self {
      rules: Arc::new(rules),
      fetcher: Arc::new(fetcher),
    }
  }

  /// Active rules.
  pub fn rules(&self) -> &InlineRules {
    &self.rules
  }

  /// Rewrite `content`, resolving local references against `origin`.
  pub async fn transform(&self, content: &str, origin: &Path) -> String {
    self.transform_with_report(content, origin).await.content
  }

  /// Rewrite `content` and report what happened to each distinct reference.
  ///
  /// References are handled strictly in document order. Each distinct reference string is
  /// validated and fetched at most once; every later occurrence reuses the cached result,
  /// including negative ones. Each processed occurrence replaces the first remaining literal
  /// match of the reference text.
  pub async fn transform_with_report(&self, content: &str, origin: &Path) -> Transformed {
    let mut cache = DocumentCache::default();
    let mut report = TransformReport::default();
    let mut content = content.to_string();

    for reference in extract_references(&content) {
      if !cache.entries.contains_key(&reference) {
        let entry = if self.rules.is_eligible(&reference) {
          let outcome =
            encode_reference(self.fetcher.as_ref(), &reference, origin, self.rules.limit()).await;
          CacheEntry::Encoded(outcome)
        } else {
          CacheEntry::Rejected
        };
        report.record(&reference, &entry);
        cache.entries.insert(reference.clone(), entry);
      }

      if let Some(data_uri) = cache.entries.get(&reference).and_then(CacheEntry::data_uri)
        && content.contains(reference.as_str())
      {
        content = content.replacen(reference.as_str(), data_uri, 1);
        report.replacements += 1;
      }
    }

    Transformed { content, report }
  }

  /// Transform a whole document.
  ///
  /// Empty documents pass through. Streaming documents are rejected. Bodies that are not UTF-8
  /// are logged and returned unchanged.
  pub async fn transform_document(
    &self,
    document: Document,
  ) -> Result<(Document, TransformReport), InlineError> {
    let (path, contents) = document.into_parts();
    let bytes = match contents {
      DocumentContents::Empty => {
        return Ok((Document::new(path, DocumentContents::Empty), TransformReport::default()));
      }
      DocumentContents::Stream(_) => return Err(InlineError::StreamingNotSupported { path }),
      DocumentContents::Buffer(bytes) => bytes,
    };

    let text = match String::from_utf8(bytes) {
      Ok(text) => text,
      Err(err) => {
        let message = format!("{}: {}", path.display(), err.utf8_error());
        log::error!("{message}");
        let report = TransformReport {
          document_error: Some(message),
          ..TransformReport::default()
        };
        return Ok((Document::new(path, DocumentContents::Buffer(err.into_bytes())), report));
      }
    };

    let Transformed { content, report } = self.transform_with_report(&text, &path).await;
    Ok((Document::from_text(path, content), report))
  }

  /// Transform several documents concurrently, keeping input order in the results.
  pub async fn transform_all(
    &self,
    documents: impl IntoIterator<Item = Document>,
  ) -> Vec<Result<(Document, TransformReport), InlineError>> {
    join_all(
      documents
        .into_iter()
        .map(|document| self.transform_document(document)),
    )
    .await
  }
}
