//! Google web search fetcher via SerpAPI.
//!
//! Runs a Google search through SerpAPI and scrapes the top organic results.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use super::article::scrape_articles;
use super::{ARTICLE_SEPARATOR, FetchError, SourceFetcher};
use crate::config::Config;
use crate::models::SourceKind;

#[derive(Debug, Clone)]
pub struct SerpApiFetcher {
    client: Client,
    base_url: String,
    max_results: usize,
    page_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    link: Option<String>,
}

impl SerpApiFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.serpapi_url.trim_end_matches('/').to_string(),
            max_results: config.max_web_results,
            page_timeout: config.page_timeout(),
        }
    }
}

/// Keep only absolute http(s) links.
fn scrapeable(link: &str) -> bool {
    Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[async_trait]
impl SourceFetcher for SerpApiFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::WebSearch
    }

    #[instrument(level = "info", skip(self, api_key))]
    async fn fetch(&self, topic: &str, api_key: Option<&str>) -> Result<String, FetchError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingCredentials("SerpAPI"))?;

        let response: SearchResponse = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .query(&[("q", topic), ("engine", "google"), ("api_key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(FetchError::InvalidResponse(error));
        }

        let urls: Vec<String> = response
            .organic_results
            .into_iter()
            .filter_map(|r| r.link)
            .filter(|link| scrapeable(link))
            .take(self.max_results)
            .collect();
        if urls.is_empty() {
            return Err(FetchError::NoResults(topic.to_string()));
        }
        info!(count = urls.len(), "Found web results; scraping");
        debug!(?urls, "SerpAPI URLs");

        let texts = scrape_articles(&self.client, urls, self.page_timeout).await;
        if texts.is_empty() {
            return Err(FetchError::NoContent(topic.to_string()));
        }
        Ok(texts.join(ARTICLE_SEPARATOR))
    }
}
