//! Per-source fetch → clean pipeline.
//!
//! A pipeline never fails: fetch errors, the legacy `ERROR:` text marker and
//! total rejection by a cleaner all come out as a non-contributing
//! [`PipelineOutcome`].

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::cleaner::clean_for_source;
use crate::fetchers::{RawResult, SourceFetcher};
use crate::models::PipelineOutcome;
use crate::utils::truncate_for_log;

/// Fetch `topic` from `fetcher` and clean the result with the matching cleaner.
///
/// # Arguments
///
/// * `fetcher` - Source to query; its kind selects the cleaner
/// * `topic` - Subject to search for
/// * `api_key` - Credential for sources that need one
///
/// # Returns
///
/// A [`PipelineOutcome`] that is never an error. Fetch failures, the legacy
/// `ERROR:` marker and text the cleaner rejects entirely all produce an empty,
/// non-contributing outcome.
#[instrument(level = "info", skip(fetcher, api_key), fields(source = %fetcher.kind()))]
pub async fn run_source_pipeline(
    fetcher: &dyn SourceFetcher,
    topic: &str,
    api_key: Option<&str>,
) -> PipelineOutcome {
    let kind = fetcher.kind();
    let t0 = Instant::now();

    let raw = match RawResult::from(fetcher.fetch(topic, api_key).await) {
        RawResult::Text(text) => text,
        RawResult::Failed { reason } => {
            warn!(
                %reason,
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetch failed; source will not contribute"
            );
            return PipelineOutcome::empty(kind);
        }
    };
    debug!(preview = %truncate_for_log(&raw, 200), "Raw source text");

    let outcome = PipelineOutcome::from_cleaned(kind, clean_for_source(kind, &raw));
    info!(
        raw_bytes = raw.len(),
        cleaned_bytes = outcome.cleaned_text.len(),
        contributed = outcome.contributed,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Source pipeline finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::FetchError;
    use crate::models::SourceKind;
    use async_trait::async_trait;

    struct Canned {
        kind: SourceKind,
        text: Option<&'static str>,
    }

    #[async_trait]
    impl SourceFetcher for Canned {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch(&self, topic: &str, _api_key: Option<&str>) -> Result<String, FetchError> {
            self.text
                .map(str::to_string)
                .ok_or_else(|| FetchError::NoResults(topic.to_string()))
        }
    }

    const LONG_LINE: &str = "A news paragraph that is definitely longer than fifty characters.";

    #[tokio::test]
    async fn test_encyclopedia_text_uses_encyclopedia_cleaner() {
        let fetcher = Canned {
            kind: SourceKind::Encyclopedia,
            text: Some("Short intro.[3]\n== History ==\nBody."),
        };
        let outcome = run_source_pipeline(&fetcher, "Rust", None).await;
        assert!(outcome.contributed);
        assert_eq!(outcome.cleaned_text, "Short intro.\nBody.");
    }

    #[tokio::test]
    async fn test_news_text_uses_generic_cleaner() {
        let fetcher = Canned {
            kind: SourceKind::NewsSearch,
            text: Some("Menu\nA news paragraph that is definitely longer than fifty characters.\nShare"),
        };
        let outcome = run_source_pipeline(&fetcher, "Rust", Some("key")).await;
        assert!(outcome.contributed);
        assert_eq!(outcome.cleaned_text, LONG_LINE);
    }

    #[tokio::test]
    async fn test_fetch_error_is_absorbed() {
        let fetcher = Canned {
            kind: SourceKind::WebSearch,
            text: None,
        };
        let outcome = run_source_pipeline(&fetcher, "Rust", None).await;
        assert_eq!(outcome, PipelineOutcome::empty(SourceKind::WebSearch));
    }

    #[tokio::test]
    async fn test_legacy_error_text_is_absorbed() {
        let fetcher = Canned {
            kind: SourceKind::Encyclopedia,
            text: Some("ERROR: Could not find a Wikipedia page for 'Rust'."),
        };
        let outcome = run_source_pipeline(&fetcher, "Rust", None).await;
        assert_eq!(outcome, PipelineOutcome::empty(SourceKind::Encyclopedia));
    }

    #[tokio::test]
    async fn test_total_rejection_does_not_contribute() {
        let fetcher = Canned {
            kind: SourceKind::NewsSearch,
            text: Some("A news paragraph that is definitely longer than fifty characters.\nVerifying you are human"),
        };
        let outcome = run_source_pipeline(&fetcher, "Rust", None).await;
        assert!(!outcome.contributed);
        assert!(outcome.cleaned_text.is_empty());
    }
}
