use std::{
  path::Path,
  time::Duration,
};

use async_trait::async_trait;
use serde::Deserialize;
use the_directory_search::{
  SearchBackend,
  SearchError,
  SearchResponse,
  SearchResult,
};

use crate::CatalogError;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
  Wrapped(SearchResponse),
  Bare(Vec<SearchResult>),
}

/// In-memory lookup over a fixed set of rows, for offline use and demos.
///
/// A row matches when its name, parent name or description contains the
/// trimmed query, ignoring case. `latency` delays every answer so the
/// loading state and out-of-order handling can be observed by hand.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  entries: Vec<SearchResult>,
  latency: Duration,
}

impl StaticCatalog {
  pub fn new(entries: Vec<SearchResult>) -> Self {
    Self {
      entries,
      latency: Duration::ZERO,
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  /// Accepts `{ "results": [...] }` or a bare array of rows.
  pub fn from_json(text: &str) -> Result<Self, CatalogError> {
    let entries = match serde_json::from_str(text)? {
      CatalogDocument::Wrapped(response) => response.results,
      CatalogDocument::Bare(entries) => entries,
    };
    Ok(Self::new(entries))
  }

  pub fn load(path: &Path) -> Result<Self, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
      CatalogError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    let catalog = Self::from_json(&text)?;
    log::info!(
      "loaded {} catalog entries from {}",
      catalog.len(),
      path.display()
    );
    Ok(catalog)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn latency(&self) -> Duration {
    self.latency
  }

  pub fn matches(&self, query: &str) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return Vec::new();
    }
    let hit = |field: &str| field.to_lowercase().contains(&needle);
    self
      .entries
      .iter()
      .filter(|entry| {
        hit(entry.name.as_str())
          || entry.parent_name.as_deref().is_some_and(hit)
          || entry.description.as_deref().is_some_and(hit)
      })
      .cloned()
      .collect()
  }
}

#[async_trait]
impl SearchBackend for StaticCatalog {
  async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    Ok(self.matches(query))
  }
}

#[cfg(test)]
mod tests {
  use the_directory_search::EntityKind;

  use super::*;

  fn catalog() -> StaticCatalog {
    StaticCatalog::new(vec![
      SearchResult::new(EntityKind::Squad, "1", "Payments", "/squads/1").with_parent("Checkout"),
      SearchResult::new(EntityKind::Person, "2", "Ada Lovelace", "/people/2")
        .with_description("Payments engineer"),
      SearchResult::new(EntityKind::Area, "3", "Logistics", "/areas/3"),
    ])
  }

  #[test]
  fn matches_any_text_field_ignoring_case() {
    let catalog = catalog();
    let ids = |query| {
      catalog
        .matches(query)
        .into_iter()
        .map(|row| row.id)
        .collect::<Vec<_>>()
    };
    assert_eq!(ids("PAYM"), vec!["1", "2"]);
    assert_eq!(ids("checkout"), vec!["1"]);
    assert_eq!(ids("  logi "), vec!["3"]);
    assert!(ids("warehouse").is_empty());
    assert!(ids("   ").is_empty());
  }

  #[test]
  fn accepts_wrapped_and_bare_documents() {
    let row = r#"{ "id": 9, "type": "service", "name": "Ledger", "url": "/services/9" }"#;
    let wrapped = StaticCatalog::from_json(&format!(r#"{{ "results": [{row}] }}"#)).unwrap();
    let bare = StaticCatalog::from_json(&format!("[{row}]")).unwrap();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(bare.len(), 1);
    assert_eq!(bare.matches("ledger")[0].kind, EntityKind::Service);
  }

  #[test]
  fn malformed_document_is_rejected() {
    assert!(matches!(
      StaticCatalog::from_json(r#"{ "results": 3 }"#),
      Err(CatalogError::Parse(_))
    ));
  }

  #[test]
  fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = StaticCatalog::load(&path).unwrap_err();
    assert!(matches!(err, CatalogError::Read { .. }));
    assert!(err.to_string().contains("missing.json"));
  }

  #[tokio::test(start_paused = true)]
  async fn latency_delays_the_answer() {
    let catalog = catalog().with_latency(Duration::from_millis(250));
    let started = tokio::time::Instant::now();
    let rows = catalog.search("ada").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(started.elapsed() >= Duration::from_millis(250));
  }
}
