//! Lookup collaborators for [`the_directory_search::SearchBox`].

mod catalog;
mod http;

use std::path::PathBuf;

use thiserror::Error;

pub use catalog::StaticCatalog;
pub use http::{
  BODY_SNIPPET_CHARS,
  HttpSearchBackend,
};

/// Failure to construct an HTTP backend.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid search endpoint {url:?}: {source}")]
  InvalidEndpoint {
    url:    String,
    #[source]
    source: url::ParseError,
  },
  #[error("search endpoint must be http or https, got {0:?}")]
  UnsupportedScheme(String),
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),
}

/// Failure to load a static catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to read catalog {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("invalid catalog JSON: {0}")]
  Parse(#[from] serde_json::Error),
}
