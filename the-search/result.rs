use std::{
  collections::HashSet,
  fmt,
};

use serde::{
  Deserialize,
  Deserializer,
  Serialize,
};

/// The closed set of catalog item categories returned by a lookup.
///
/// Kinds the client doesn't know about are preserved in `Unknown` rather than
/// rejected so one odd row never fails a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
  Area,
  Cluster,
  Squad,
  Person,
  Service,
  Unknown(String),
}

impl EntityKind {
  pub fn parse(value: &str) -> Self {
    match value.trim().to_ascii_lowercase().as_str() {
      "area" => Self::Area,
      "tribe" | "cluster" => Self::Cluster,
      "squad" => Self::Squad,
      "person" => Self::Person,
      "service" => Self::Service,
      _ => Self::Unknown(value.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Area => "area",
      Self::Cluster => "cluster",
      Self::Squad => "squad",
      Self::Person => "person",
      Self::Service => "service",
      Self::Unknown(other) => other,
    }
  }

  /// Human label used in result rows.
  pub fn label(&self) -> &str {
    match self {
      Self::Area => "Area",
      Self::Cluster => "Cluster",
      Self::Squad => "Squad",
      Self::Person => "Person",
      Self::Service => "Service",
      Self::Unknown(other) => other,
    }
  }
}

impl From<String> for EntityKind {
  fn from(value: String) -> Self {
    Self::parse(&value)
  }
}

impl From<EntityKind> for String {
  fn from(kind: EntityKind) -> Self {
    kind.as_str().to_string()
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One item of a lookup batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
  #[serde(deserialize_with = "deserialize_id")]
  pub id:          String,
  #[serde(rename = "type")]
  pub kind:        EntityKind,
  pub name:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub url:         String,
}

impl SearchResult {
  pub fn new(
    kind: EntityKind,
    id: impl Into<String>,
    name: impl Into<String>,
    url: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      kind,
      name: name.into(),
      parent_name: None,
      description: None,
      url: url.into(),
    }
  }

  pub fn with_parent(mut self, parent_name: impl Into<String>) -> Self {
    self.parent_name = Some(parent_name.into());
    self
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// `(type, id)` is the identity of a row within a batch.
  pub fn key(&self) -> (&EntityKind, &str) {
    (&self.kind, &self.id)
  }
}

/// Wire shape of a lookup response: `{ "results": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
  #[serde(default)]
  pub results: Vec<SearchResult>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
  }

  Ok(match RawId::deserialize(deserializer)? {
    RawId::Text(text) => text,
    RawId::Signed(value) => value.to_string(),
    RawId::Unsigned(value) => value.to_string(),
  })
}

/// Drop rows whose `(type, id)` already appeared earlier in the batch and
/// cap the batch at `limit` rows.
pub(crate) fn normalize_batch(results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
  let mut seen = HashSet::with_capacity(results.len());
  let mut batch = Vec::with_capacity(results.len().min(limit));
  for result in results {
    if batch.len() >= limit {
      break;
    }
    if !seen.insert((result.kind.clone(), result.id.clone())) {
      log::warn!(
        "dropping duplicate search result {}:{}",
        result.kind,
        result.id
      );
      continue;
    }
    batch.push(result);
  }
  batch
}
