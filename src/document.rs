//! Units of content handed to the inliner.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncRead;

/// Body of a document.
pub enum DocumentContents {
  /// No contents at all; passed through untouched.
  Empty,
  /// Fully buffered bytes, expected to be UTF-8 text.
  Buffer(Vec<u8>),
  /// Streaming body. Not supported by the inliner.
  Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl fmt::Debug for DocumentContents {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => f.write_str("Empty"),
      Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
      Self::Stream(_) => f.write_str("Stream"),
    }
  }
}

/// A file-like unit: where it came from plus its contents.
///
/// The path is used to resolve relative asset references and need not exist on disk.
#[derive(Debug)]
pub struct Document {
  path: PathBuf,
  contents: DocumentContents,
}

impl Document {
  /// Document with the given origin and contents.
  pub fn new(path: impl Into<PathBuf>, contents: DocumentContents) -> Self {
    Self {
      path: path.into(),
      contents,
    }
  }

  /// Buffered text document.
  pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
    Self::new(path, DocumentContents::Buffer(text.into().into_bytes()))
  }

  /// Origin location of the document.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Borrow the contents.
  pub fn contents(&self) -> &DocumentContents {
    &self.contents
  }

  /// Buffered bytes, if the document is buffered.
  pub fn bytes(&self) -> Option<&[u8]> {
    match &self.contents {
      DocumentContents::Buffer(bytes) => Some(bytes),
      DocumentContents::Empty | DocumentContents::Stream(_) => None,
    }
  }

  /// Buffered contents as text, if they are valid UTF-8.
  pub fn text(&self) -> Option<&str> {
    self.bytes().and_then(|bytes| std::str::from_utf8(bytes).ok())
  }

  pub(crate) fn into_parts(self) -> (PathBuf, DocumentContents) {
    (self.path, self.contents)
  }
}
