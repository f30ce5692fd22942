//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building one HTTP client with a browser-like header set
//! - GET requests with a fixed timeout
//! - Classifying failures into `FetchError`
//!
//! There is no retry here; a failed fetch is reported and the caller decides
//! what it means for its traversal.

use crate::config::{Config, HttpConfig};
use crate::{FetchError, FetchFailure};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// A fetched page, ready to be parsed
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL after redirects
    pub url: Url,

    /// Response body
    pub body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Parses the body as an HTML document
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Builds an HTTP client with browser-like default headers
///
/// # Arguments
///
/// * `config` - The request header configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use agent_atlas::config::HttpConfig;
/// use agent_atlas::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&HttpConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Single-owner handle issuing GET requests for the crawl
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.http, config.crawler.request_timeout())?;
        Ok(Self::new(client))
    }

    /// Fetches a URL and returns its body
    ///
    /// # Failure Classification
    ///
    /// | Condition | Cause |
    /// |-----------|-------|
    /// | Timeout | `FetchFailure::Timeout` |
    /// | Non-2xx status | `FetchFailure::Status` |
    /// | Connection or protocol error | `FetchFailure::Network` |
    /// | Body could not be read | `FetchFailure::Body` |
    pub async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        tracing::debug!("Fetching: {}", url);

        let fail = |cause| FetchError {
            url: url.to_string(),
            cause,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fail(classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchFailure::Status(status.as_u16())));
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                fail(FetchFailure::Timeout)
            } else {
                fail(FetchFailure::Body(e.to_string()))
            }
        })?;

        Ok(Document::new(final_url, body))
    }
}

fn classify(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Network(format!("connection failed: {}", error))
    } else {
        FetchFailure::Network(error.to_string())
    }
}
