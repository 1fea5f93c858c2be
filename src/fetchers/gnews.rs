//! GNews news search fetcher.
//!
//! Searches the GNews API for recent English articles about the topic, then
//! scrapes each article page. Texts are joined with [`ARTICLE_SEPARATOR`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::article::scrape_articles;
use super::{ARTICLE_SEPARATOR, FetchError, SourceFetcher};
use crate::config::Config;
use crate::models::SourceKind;

#[derive(Debug, Clone)]
pub struct GNewsFetcher {
    client: Client,
    base_url: String,
    max_articles: usize,
    page_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    url: String,
}

impl GNewsFetcher {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.gnews_api_url.trim_end_matches('/').to_string(),
            max_articles: config.max_news_articles,
            page_timeout: config.page_timeout(),
        }
    }

    /// Request URL, built the same way the GNews docs show it.
    fn search_url(&self, topic: &str, api_key: &str) -> String {
        format!(
            "{}/search?q={}&lang=en&max={}&apikey={}",
            self.base_url,
            urlencoding::encode(topic),
            self.max_articles,
            urlencoding::encode(api_key)
        )
    }
}

#[async_trait]
impl SourceFetcher for GNewsFetcher {
    fn kind(&self) -> SourceKind {
        SourceKind::NewsSearch
    }

    #[instrument(level = "info", skip(self, api_key))]
    async fn fetch(&self, topic: &str, api_key: Option<&str>) -> Result<String, FetchError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingCredentials("GNews"))?;

        let response: SearchResponse = self
            .client
            .get(self.search_url(topic, api_key))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.articles.is_empty() {
            return Err(FetchError::NoResults(topic.to_string()));
        }

        let urls: Vec<String> = response
            .articles
            .into_iter()
            .take(self.max_articles)
            .map(|a| a.url)
            .collect();
        info!(count = urls.len(), "Found news articles; scraping");

        let texts = scrape_articles(&self.client, urls, self.page_timeout).await;
        if texts.is_empty() {
            return Err(FetchError::NoContent(topic.to_string()));
        }
        Ok(texts.join(ARTICLE_SEPARATOR))
    }
}
