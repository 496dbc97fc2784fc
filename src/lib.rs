#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod encoder;
pub mod error;
pub mod extensions;
pub mod fetch;
pub mod references;
pub mod rules;
pub mod transform;

pub use config::{InlineOptions, RuleList, RuleSpec};
pub use document::{Document, DocumentContents};
pub use encoder::{EncodingOutcome, encode_reference};
pub use error::{ConfigError, FetchError, InlineError};
pub use extensions::{ExtensionList, normalize_extensions};
pub use fetch::{
  AssetFetcher, AssetLocation, DefaultFetcher, FetchOutcome, FetchedAsset, FsFetcher, HttpFetcher,
};
pub use references::extract_references;
pub use rules::{InlineRules, MatchRule};
pub use transform::{Inliner, TransformReport, Transformed};
