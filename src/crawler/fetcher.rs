//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client from the `[http]` settings
//! - GET requests for catalog pages
//! - Classifying unusable responses as page failures

use crate::config::HttpConfig;
use crate::crawler::parser::{extract_products, ProductRecord, TileSelectors};
use crate::ScrapeError;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Outcome of fetching and extracting one catalog page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// The page was parsed; holds every in-stock product on it
    Extracted {
        /// Records in page order
        records: Vec<ProductRecord>,
    },

    /// The page did not yield a record list
    Failed(PageFailure),
}

impl PageResult {
    /// Number of products counted for this page
    pub fn count(&self) -> usize {
        match self {
            Self::Extracted { records } => records.len(),
            Self::Failed(_) => 0,
        }
    }
}

/// Why a page did not yield a record list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailure {
    /// The server answered with something other than 200
    Status(u16),

    /// The response is not an HTML document
    ContentMismatch(String),

    /// The body could not be read or decoded
    Body(String),
}

impl fmt::Display for PageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "status code {}", code),
            Self::ContentMismatch(content_type) => {
                write!(f, "unexpected content type '{}'", content_type)
            }
            Self::Body(error) => write!(f, "unreadable body: {}", error),
        }
    }
}

/// Builds the HTTP client used for every page request
///
/// Sends the configured `User-Agent`, decodes gzip and brotli bodies and
/// follows redirects with reqwest's default policy.
///
/// # Example
///
/// ```no_run
/// use catalog_scraper::config::HttpConfig;
/// use catalog_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a catalog page and extracts its products
///
/// # Response Handling
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP status other than 200 | `Failed(Status)` |
/// | Content-Type present but not HTML | `Failed(ContentMismatch)` |
/// | Body cannot be read | `Failed(Body)` |
/// | Otherwise | `Extracted` with the in-stock tiles |
///
/// # Errors
///
/// Returns `ScrapeError::Http` when the request itself could not be sent
/// (connection refused, timeout, DNS failure), and `ScrapeError::UrlParse`
/// when `url` is not a valid URL.
pub async fn fetch_and_extract(
    client: &Client,
    url: &str,
    selectors: &TileSelectors,
) -> Result<PageResult, ScrapeError> {
    let started = Instant::now();
    let page_url = Url::parse(url)?;

    let response = client
        .get(page_url.clone())
        .send()
        .await
        .map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Ok(PageResult::Failed(PageFailure::Status(status.as_u16())));
    }

    if let Some(content_type) = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        if !content_type.contains("html") {
            return Ok(PageResult::Failed(PageFailure::ContentMismatch(
                content_type.to_string(),
            )));
        }
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return Ok(PageResult::Failed(PageFailure::Body(e.to_string()))),
    };

    let records = extract_products(&body, &page_url, selectors);

    tracing::debug!(
        "Parsed {} in {:.6}s ({} bytes, {} products)",
        url,
        started.elapsed().as_secs_f64(),
        body.len(),
        records.len()
    );

    Ok(PageResult::Extracted { records })
}
