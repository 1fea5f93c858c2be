//! Source fetchers for the three upstream text sources.
//!
//! Each fetcher turns a topic into raw, uncleaned text:
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Wikipedia | [`wikipedia`] | MediaWiki `extracts` API | Plain-text article body |
//! | GNews | [`gnews`] | Search API + page scraping | Requires API key |
//! | SerpAPI | [`serpapi`] | Google results + page scraping | Requires API key |
//!
//! The job manager only sees the [`SourceFetcher`] trait. Whatever a fetcher
//! returns is normalized once into a [`RawResult`] at the pipeline boundary,
//! so callers never inspect text for error markers themselves.

pub mod article;
pub mod gnews;
pub mod serpapi;
pub mod wikipedia;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::error::Result;
use crate::models::SourceKind;

pub use gnews::GNewsFetcher;
pub use serpapi::SerpApiFetcher;
pub use wikipedia::WikipediaFetcher;

/// Prefix some fetchers historically used to smuggle an error through the text channel.
pub const LEGACY_ERROR_PREFIX: &str = "ERROR:";

/// Article separator used when a source concatenates several scraped pages.
pub const ARTICLE_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0} API key is not configured")]
    MissingCredentials(&'static str),

    #[error("no page found for '{0}'")]
    NotFound(String),

    #[error("no results found for '{0}'")]
    NoResults(String),

    #[error("no content could be scraped for '{0}'")]
    NoContent(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Fetches raw text about a topic from one external source.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Which source this fetcher talks to.
    fn kind(&self) -> SourceKind;

    /// Fetch raw text for `topic`. `api_key` carries the credentials the job
    /// was submitted with; sources that need none ignore it.
    async fn fetch(&self, topic: &str, api_key: Option<&str>) -> std::result::Result<String, FetchError>;
}

/// A fetch result normalized into success-with-text or failure-with-reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResult {
    Text(String),
    Failed { reason: String },
}

impl From<std::result::Result<String, FetchError>> for RawResult {
    fn from(result: std::result::Result<String, FetchError>) -> Self {
        match result {
            Ok(text) => match text.strip_prefix(LEGACY_ERROR_PREFIX) {
                Some(reason) => RawResult::Failed {
                    reason: reason.trim().to_string(),
                },
                None => RawResult::Text(text),
            },
            Err(e) => RawResult::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// API keys handed to the fetchers of one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub news_api_key: Option<String>,
    pub web_api_key: Option<String>,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        Self {
            news_api_key: config.gnews_api_key.clone(),
            web_api_key: config.serpapi_api_key.clone(),
        }
    }

    pub fn for_source(&self, kind: SourceKind) -> Option<&str> {
        match kind {
            SourceKind::Encyclopedia => None,
            SourceKind::NewsSearch => self.news_api_key.as_deref(),
            SourceKind::WebSearch => self.web_api_key.as_deref(),
        }
    }
}

/// The three fetchers a job fans out to.
#[derive(Clone)]
pub struct Sources {
    encyclopedia: Arc<dyn SourceFetcher>,
    news: Arc<dyn SourceFetcher>,
    web: Arc<dyn SourceFetcher>,
}

impl Sources {
    pub fn new(
        encyclopedia: Arc<dyn SourceFetcher>,
        news: Arc<dyn SourceFetcher>,
        web: Arc<dyn SourceFetcher>,
    ) -> Self {
        Self {
            encyclopedia,
            news,
            web,
        }
    }

    /// Production fetchers sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::new(
            Arc::new(WikipediaFetcher::new(client.clone(), config)),
            Arc::new(GNewsFetcher::new(client.clone(), config)),
            Arc::new(SerpApiFetcher::new(client, config)),
        ))
    }

    pub fn get(&self, kind: SourceKind) -> Arc<dyn SourceFetcher> {
        match kind {
            SourceKind::Encyclopedia => Arc::clone(&self.encyclopedia),
            SourceKind::NewsSearch => Arc::clone(&self.news),
            SourceKind::WebSearch => Arc::clone(&self.web),
        }
    }
}

/// Shared client carrying the configured user agent and API timeout.
pub fn build_http_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_result_from_text() {
        let raw = RawResult::from(Ok("Some article text".to_string()));
        assert_eq!(raw, RawResult::Text("Some article text".to_string()));
    }

    #[test]
    fn test_raw_result_normalizes_legacy_error_prefix() {
        let raw = RawResult::from(Ok("ERROR: GNews API Key is not configured.".to_string()));
        assert_eq!(
            raw,
            RawResult::Failed {
                reason: "GNews API Key is not configured.".to_string()
            }
        );
    }

    #[test]
    fn test_raw_result_prefix_must_lead() {
        let raw = RawResult::from(Ok("An ERROR: in the middle is fine".to_string()));
        assert!(matches!(raw, RawResult::Text(_)));
    }

    #[test]
    fn test_raw_result_from_error() {
        let raw = RawResult::from(Err(FetchError::MissingCredentials("SerpAPI")));
        assert_eq!(
            raw,
            RawResult::Failed {
                reason: "SerpAPI API key is not configured".to_string()
            }
        );
    }

    #[test]
    fn test_credentials_per_source() {
        let creds = Credentials {
            news_api_key: Some("news".to_string()),
            web_api_key: None,
        };
        assert_eq!(creds.for_source(SourceKind::Encyclopedia), None);
        assert_eq!(creds.for_source(SourceKind::NewsSearch), Some("news"));
        assert_eq!(creds.for_source(SourceKind::WebSearch), None);
    }
}
