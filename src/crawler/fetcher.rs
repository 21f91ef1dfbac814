//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests that follow redirects and record the final URL
//! - Bounded, unordered concurrent fetching of a batch of URLs
//!
//! Failed requests are reported to the caller and never retried.

use crate::config::ScraperConfig;
use crate::ScrapeError;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested
    pub url: String,
    /// URL after following redirects
    pub final_url: String,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single URL
///
/// Non-success status codes are treated as failures, so a missing page
/// surfaces as an error instead of an error page being parsed.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, ScrapeError> {
    let http_error = |source: reqwest::Error| ScrapeError::Http {
        url: url.to_string(),
        source,
    };

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(http_error)?;

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(http_error)?;

    Ok(FetchedPage {
        url: url.to_string(),
        final_url,
        body,
    })
}

/// Fetches a batch of URLs concurrently
///
/// At most `concurrency` requests are in flight at any time. Results are
/// yielded as they complete, not in request order, each paired with the URL
/// that was requested.
///
/// # Example
///
/// ```no_run
/// use bier_index_scraper::config::ScraperConfig;
/// use bier_index_scraper::crawler::{build_http_client, fetch_all};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = build_http_client(&ScraperConfig::default())?;
/// let urls = vec!["https://www.bier-index.de/biere/edelstoff.html".to_string()];
/// let mut pages = fetch_all(&client, urls, 4);
/// while let Some((url, result)) = pages.next().await {
///     println!("{}: {}", url, result.is_ok());
/// }
/// # Ok(())
/// # }
/// ```
pub fn fetch_all<'a>(
    client: &'a Client,
    urls: Vec<String>,
    concurrency: usize,
) -> BoxStream<'a, (String, Result<FetchedPage, ScrapeError>)> {
    stream::iter(urls)
        .map(move |url| async move {
            let result = fetch_page(client, &url).await;
            (url, result)
        })
        .buffer_unordered(concurrency.max(1))
        .boxed()
}
