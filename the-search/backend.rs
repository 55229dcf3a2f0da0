use std::sync::Arc;

use async_trait::async_trait;

use crate::{
  error::SearchError,
  result::SearchResult,
};

/// The lookup collaborator. Calls may fail and may complete in any order
/// relative to each other.
#[async_trait]
pub trait SearchBackend: Send + Sync + 'static {
  async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
  async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
    (**self).search(query).await
  }
}

/// Moves the application to a new location. Fire-and-forget.
pub trait Navigator {
  fn navigate(&mut self, url: &str);
}

impl<F: FnMut(&str)> Navigator for F {
  fn navigate(&mut self, url: &str) {
    self(url)
  }
}
