//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file
//! (`--config`), then CLI flags and environment variables (see [`crate::cli::Cli`]).
//!
//! ```yaml
//! gnews_api_key: "..."
//! serpapi_api_key: "..."
//! max_news_articles: 5
//! max_concurrent_jobs: 4
//! job_retention_secs: 3600
//! archive_dir: ./results
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("topic_corpus/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GNews API key; the news source is skipped when absent.
    pub gnews_api_key: Option<String>,
    /// SerpAPI key; the web search source is skipped when absent.
    pub serpapi_api_key: Option<String>,

    /// Base URL of the MediaWiki API, `{lang}` is replaced by `wikipedia_language`.
    pub wikipedia_api_url: String,
    pub wikipedia_language: String,
    pub gnews_api_url: String,
    pub serpapi_url: String,

    /// Number of news articles requested from GNews.
    pub max_news_articles: usize,
    /// Number of organic web results scraped.
    pub max_web_results: usize,

    /// Timeout for API calls, in seconds.
    pub request_timeout_secs: u64,
    /// Timeout for scraping a single article page, in seconds.
    pub page_timeout_secs: u64,
    pub user_agent: String,

    /// Upper bound on jobs running at the same time.
    pub max_concurrent_jobs: usize,
    /// Finished jobs older than this are evicted; kept forever when unset.
    pub job_retention_secs: Option<u64>,
    /// Directory for `{job_id}.json` archives of succeeded jobs.
    pub archive_dir: Option<PathBuf>,
    /// How often the CLI polls job status, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gnews_api_key: None,
            serpapi_api_key: None,
            wikipedia_api_url: "https://{lang}.wikipedia.org/w/api.php".to_string(),
            wikipedia_language: "en".to_string(),
            gnews_api_url: "https://gnews.io/api/v4".to_string(),
            serpapi_url: "https://serpapi.com".to_string(),
            max_news_articles: 5,
            max_web_results: 3,
            request_timeout_secs: 10,
            page_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent_jobs: 4,
            job_retention_secs: None,
            archive_dir: None,
            poll_interval_ms: 500,
        }
    }
}

impl Config {
    /// Parse a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)?;
        info!("Loaded configuration file");
        Ok(config)
    }

    /// Build the effective configuration for a CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let base = match cli.config.as_deref() {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };
        let config = base.merge_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI flags (and their environment variables) over file values.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(key) = &cli.gnews_api_key {
            self.gnews_api_key = Some(key.clone());
        }
        if let Some(key) = &cli.serpapi_api_key {
            self.serpapi_api_key = Some(key.clone());
        }
        if let Some(dir) = &cli.archive_dir {
            self.archive_dir = Some(PathBuf::from(dir));
        }
        if let Some(n) = cli.max_concurrent_jobs {
            self.max_concurrent_jobs = n;
        }
        if let Some(ms) = cli.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_jobs == 0 {
            return Err(Error::config("max_concurrent_jobs must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::config("poll_interval_ms must be at least 1"));
        }
        if self.wikipedia_language.trim().is_empty() {
            return Err(Error::config("wikipedia_language must not be empty"));
        }
        Ok(())
    }

    /// MediaWiki endpoint with the language substituted.
    pub fn wikipedia_endpoint(&self) -> String {
        self.wikipedia_api_url
            .replace("{lang}", &self.wikipedia_language)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn job_retention(&self) -> Option<Duration> {
        self.job_retention_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults_match_upstream_limits() {
        let config = Config::default();
        assert_eq!(config.max_news_articles, 5);
        assert_eq!(config.max_web_results, 3);
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.job_retention(), None);
        assert_eq!(
            config.wikipedia_endpoint(),
            "https://en.wikipedia.org/w/api.php"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gnews_api_key: abc\nwikipedia_language: de\njob_retention_secs: 60"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.gnews_api_key.as_deref(), Some("abc"));
        assert_eq!(config.serpapi_api_key, None);
        assert_eq!(config.job_retention(), Some(Duration::from_secs(60)));
        assert_eq!(
            config.wikipedia_endpoint(),
            "https://de.wikipedia.org/w/api.php"
        );
        assert_eq!(config.max_web_results, 3);
    }

    #[test]
    fn test_from_file_rejects_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_jobs: [not, a, number]").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "topic_corpus",
            "--gnews-api-key",
            "from-cli",
            "--max-concurrent-jobs",
            "2",
            "--archive-dir",
            "/tmp/archive",
            "Rust",
        ]);
        let base = Config {
            gnews_api_key: Some("from-file".to_string()),
            serpapi_api_key: Some("serp".to_string()),
            ..Config::default()
        };

        let config = base.merge_cli(&cli);
        assert_eq!(config.gnews_api_key.as_deref(), Some("from-cli"));
        assert_eq!(config.serpapi_api_key.as_deref(), Some("serp"));
        assert_eq!(config.max_concurrent_jobs, 2);
        assert_eq!(config.archive_dir, Some(PathBuf::from("/tmp/archive")));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = Config {
            max_concurrent_jobs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }
}
