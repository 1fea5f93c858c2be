//! Wikipedia article fetcher.
//!
//! Uses the MediaWiki `extracts` API with `explaintext`, which returns the
//! article body as plain text with `== Section ==` headings left in place for
//! the encyclopedia cleaner to remove. Redirects are followed, so a topic like
//! "Rust language" resolves to its canonical article.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{FetchError, SourceFetcher};
use crate::config::Config;
use crate::models::SourceKind;

#[derive(Debug, Clone)]
pub struct WikipediaFetcher {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: HashMap<String, WikiPage>,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    title: Option<String>,
    extract: Option<String>,
    missing: Option<serde_json::Value>,
    invalid: Option<serde_json::Value>,
}

impl WikipediaFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self::with_endpoint(client, config.wikipedia_endpoint())
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SourceFetcher for WikipediaFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::Encyclopedia
    }

    #[instrument(level = "info", skip(self, _api_key))]
    async fn fetch(&self, topic: &str, _api_key: Option<&str>) -> Result<String, FetchError> {
        let response: QueryResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", topic),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let page = response
            .query
            .and_then(|q| q.pages.into_values().next())
            .ok_or_else(|| FetchError::InvalidResponse("missing query.pages".to_string()))?;

        if page.missing.is_some() || page.invalid.is_some() {
            warn!("Page does not exist on Wikipedia");
            return Err(FetchError::NotFound(topic.to_string()));
        }

        let text = page.extract.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(FetchError::NotFound(topic.to_string()));
        }

        info!(
            title = page.title.as_deref().unwrap_or(topic),
            bytes = text.len(),
            "Fetched Wikipedia page"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_extract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("titles", "Rust"))
            .and(query_param("prop", "extracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": {"123": {
                    "pageid": 123,
                    "title": "Rust (programming language)",
                    "extract": "Rust is a language.\n\n== History ==\nIt began in 2006."
                }}}
            })))
            .mount(&server)
            .await;

        let fetcher = WikipediaFetcher::with_endpoint(Client::new(), format!("{}/w/api.php", server.uri()));
        let text = fetcher.fetch("Rust", None).await.unwrap();
        assert!(text.starts_with("Rust is a language."));
        assert!(text.contains("== History =="));
    }

    #[tokio::test]
    async fn test_fetch_missing_page_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {"pages": {"-1": {"ns": 0, "title": "Nope", "missing": ""}}}
            })))
            .mount(&server)
            .await;

        let fetcher = WikipediaFetcher::with_endpoint(Client::new(), format!("{}/w/api.php", server.uri()));
        let err = fetcher.fetch("Nope", None).await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(ref t) if t == "Nope"));
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = WikipediaFetcher::with_endpoint(Client::new(), format!("{}/w/api.php", server.uri()));
        assert!(matches!(
            fetcher.fetch("Rust", None).await,
            Err(FetchError::Http(_))
        ));
    }
}
