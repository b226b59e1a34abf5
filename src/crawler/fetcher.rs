//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests for pages (through the [`Fetcher`] trait) and documents
//! - Bounded retry with exponential backoff for transient failures
//! - Error classification into [`FetchError`]

use crate::config::{Config, CrawlerConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Redirect hops followed before a request fails
const MAX_REDIRECTS: usize = 10;

/// Why a fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Page task for {url} panicked: {message}")]
    Panicked { url: String, message: String },
}

impl FetchError {
    /// Maps a transport error to its variant
    pub fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Http { url, source: error }
        }
    }

    /// Returns true if a later attempt could succeed
    ///
    /// | Condition | Transient |
    /// |-----------|-----------|
    /// | Timeout | yes |
    /// | Connection failed | yes |
    /// | HTTP 5xx | yes |
    /// | HTTP 429 | yes |
    /// | Other HTTP status | no |
    /// | Redirect limit, body decode, etc. | no |
    /// | Page task panicked | no |
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Status { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            Self::Http { .. } | Self::Panicked { .. } => false,
        }
    }
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,

    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Page body; empty when the response was not HTML
    pub body: String,
}

impl FetchedPage {
    pub fn html(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            content_type: Some("text/html".to_string()),
            body: body.into(),
        }
    }

    /// A missing Content-Type is treated as HTML
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().map_or(true, is_html_content_type)
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    lowered.contains("text/html") || lowered.contains("application/xhtml")
}

/// Source of page bodies for the crawl engine
///
/// The engine only ever sees this trait, so it can run against the real
/// network ([`HttpFetcher`]) or an in-memory site.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Bounded retry schedule: `base_delay * 2^attempt` between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Builds an HTTP client with proper configuration
///
/// The per-request timeout from the configuration bounds every page fetch and
/// document download; redirects are followed up to a fixed limit.
///
/// # Example
///
/// ```no_run
/// use doc_harvester::config::Config;
/// use doc_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.fetch_timeout())
        .connect_timeout(config.crawler.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET request, retrying transient failures per `policy`
///
/// Non-2xx responses become [`FetchError::Status`]. The returned response has
/// a success status and an unread body.
pub async fn send_with_retries(
    client: &Client,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<Response, FetchError> {
    let mut attempt = 0;

    loop {
        let result = match client.get(url.clone()).send().await {
            Ok(response) => check_status(url, response),
            Err(e) => Err(FetchError::from_reqwest(url, e)),
        };

        match result {
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Retrying {} in {:?} (attempt {}/{}): {}",
                    url,
                    delay,
                    attempt + 1,
                    policy.max_retries,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn check_status(url: &Url, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = send_with_retries(&self.client, url, &self.retry).await?;

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let page = FetchedPage {
            url: final_url,
            content_type,
            body: String::new(),
        };

        // Don't pull non-HTML bodies into memory just to find no anchors
        if !page.is_html() {
            tracing::debug!(
                "Skipping body of {} ({})",
                url,
                page.content_type.as_deref().unwrap_or_default()
            );
            return Ok(page);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage { body, ..page })
    }
}
