use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single lookup. Never fatal: the coordinator logs it and the
/// session degrades to "no results".
#[derive(Debug, Error)]
pub enum SearchError {
  #[error("search request failed: {0}")]
  Transport(#[source] BoxError),
  #[error("search service returned status {status}: {body}")]
  Status { status: u16, body: String },
  #[error("failed to decode search response: {0}")]
  Decode(#[from] serde_json::Error),
  #[error("search service unavailable: {0}")]
  Unavailable(String),
}

impl SearchError {
  pub fn transport(err: impl Into<BoxError>) -> Self {
    Self::Transport(err.into())
  }
}
