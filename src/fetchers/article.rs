//! Article page scraping shared by the news and web search fetchers.
//!
//! Both search sources only yield URLs; the text comes from downloading each
//! page and pulling its readable paragraphs out of the HTML.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use super::FetchError;

/// Pages of one source scraped at the same time.
const SCRAPE_CONCURRENCY: usize = 3;

/// Scrape every URL concurrently and keep the non-empty texts in input order.
///
/// Individual page failures are logged and skipped.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn scrape_articles(client: &Client, urls: Vec<String>, timeout: Duration) -> Vec<String> {
    let texts: Vec<String> = stream::iter(urls)
        .map(|url| async move {
            match scrape_article(client, &url, timeout).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(%url, bytes = text.len(), "Scraped article");
                    Some(text)
                }
                Ok(_) => {
                    warn!(%url, "Article produced no content");
                    None
                }
                Err(e) => {
                    warn!(%url, error = %e, "Article scrape failed");
                    None
                }
            }
        })
        .buffered(SCRAPE_CONCURRENCY)
        .filter_map(std::future::ready)
        .collect()
        .await;

    info!(count = texts.len(), "Scraped article contents");
    texts
}

/// Download a single page and extract its text.
#[instrument(level = "debug", skip(client, timeout))]
pub async fn scrape_article(client: &Client, url: &str, timeout: Duration) -> Result<String, FetchError> {
    let body = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(extract_text(&body))
}

/// Pull readable text out of an HTML document.
///
/// Prefers `<article>` paragraphs, then any `<p>`, then the whole `<body>`.
/// Each paragraph becomes one line.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in ["article p", "p"] {
        let paragraphs = select_lines(&document, selector);
        if !paragraphs.is_empty() {
            return paragraphs.join("\n");
        }
    }

    select_lines(&document, "body").join("\n")
}

fn select_lines(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| {
            element
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_prefers_article_paragraphs() {
        let html = r#"<html><body>
            <nav><p>Home</p></nav>
            <article><p>First <b>bold</b> paragraph.</p><p>Second paragraph.</p></article>
        </body></html>"#;
        assert_eq!(extract_text(html), "First bold paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_extract_falls_back_to_all_paragraphs() {
        let html = "<html><body><div><p>One.</p></div><p>Two.</p></body></html>";
        assert_eq!(extract_text(html), "One.\nTwo.");
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        let html = "<html><body><div>Just a div.</div></body></html>";
        assert_eq!(extract_text(html), "Just a div.");
    }

    #[tokio::test]
    async fn test_scrape_articles_skips_failures_and_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Alpha</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Gamma</p>"))
            .mount(&server)
            .await;

        let urls = ["/a", "/b", "/c"]
            .iter()
            .map(|p| format!("{}{}", server.uri(), p))
            .collect();
        let texts = scrape_articles(&Client::new(), urls, Duration::from_secs(5)).await;
        assert_eq!(texts, vec!["Alpha".to_string(), "Gamma".to_string()]);
    }
}
