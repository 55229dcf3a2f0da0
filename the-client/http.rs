use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use the_directory_search::{
  SearchBackend,
  SearchError,
  SearchResponse,
  SearchResult,
};
use url::Url;

use crate::ClientError;

/// Error bodies are cut to this many characters before they reach the log.
pub const BODY_SNIPPET_CHARS: usize = 200;

/// Lookup service reached over HTTP: `GET <endpoint>?q=<query>` answering
/// `{ "results": [...] }`.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
  client:   Client,
  endpoint: Url,
}

impl HttpSearchBackend {
  pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
    let endpoint = Url::parse(endpoint).map_err(|source| {
      ClientError::InvalidEndpoint {
        url: endpoint.to_string(),
        source,
      }
    })?;
    if !matches!(endpoint.scheme(), "http" | "https") {
      return Err(ClientError::UnsupportedScheme(endpoint.scheme().to_string()));
    }

    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(ClientError::Build)?;

    Ok(Self { client, endpoint })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  /// The request URL for `query`. Existing query parameters on the endpoint
  /// are kept.
  pub fn search_url(&self, query: &str) -> Url {
    let mut url = self.endpoint.clone();
    url.query_pairs_mut().append_pair("q", query);
    url
  }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
  async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
    let url = self.search_url(query);
    log::debug!("GET {url}");

    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(SearchError::transport)?;
    let status = response.status();
    let body = response.text().await.map_err(SearchError::transport)?;

    if !status.is_success() {
      return Err(SearchError::Status {
        status: status.as_u16(),
        body:   snippet(&body),
      });
    }

    let response: SearchResponse = serde_json::from_str(&body)?;
    Ok(response.results)
  }
}

fn snippet(body: &str) -> String {
  body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_is_form_encoded() {
    let backend =
      HttpSearchBackend::new("http://localhost:8080/api/search", Duration::from_secs(1)).unwrap();
    assert_eq!(
      backend.search_url("pay & go").as_str(),
      "http://localhost:8080/api/search?q=pay+%26+go"
    );
  }

  #[test]
  fn existing_parameters_are_kept() {
    let backend =
      HttpSearchBackend::new("https://dir.example/search?scope=all", Duration::from_secs(1))
        .unwrap();
    assert_eq!(
      backend.search_url("ada").as_str(),
      "https://dir.example/search?scope=all&q=ada"
    );
  }

  #[test]
  fn rejects_bad_endpoints() {
    assert!(matches!(
      HttpSearchBackend::new("not a url", Duration::from_secs(1)),
      Err(ClientError::InvalidEndpoint { .. })
    ));
    assert!(matches!(
      HttpSearchBackend::new("ftp://dir.example/search", Duration::from_secs(1)),
      Err(ClientError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
  }

  #[test]
  fn snippet_counts_characters() {
    let body = "é".repeat(BODY_SNIPPET_CHARS + 10);
    assert_eq!(snippet(&body).chars().count(), BODY_SNIPPET_CHARS);
    assert_eq!(snippet("short"), "short");
  }
}
