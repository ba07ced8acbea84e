//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for listing and detail pages
//! - Opening streamed document downloads
//! - Error classification
//!
//! Every request goes through [`HttpSession`], which applies the politeness
//! delay first. There is exactly one attempt per request.

use crate::config::Config;
use crate::crawler::rate_limit::RateLimiter;
use crate::HarvestError;
use reqwest::{Client, Response};
use scraper::Html;
use std::time::Duration;
use url::Url;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Converts a successful fetch into a page, or describes the failure
    pub fn into_page(self) -> Result<FetchedPage, String> {
        match self {
            Self::Success {
                final_url, body, ..
            } => {
                let url = Url::parse(&final_url).map_err(|e| e.to_string())?;
                Ok(FetchedPage { url, body })
            }
            Self::HttpError { status_code } => Err(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Err(error),
        }
    }
}

/// A fetched HTML page: its final URL and raw body
///
/// The parsed document is rebuilt on demand by whichever stage scans it, so
/// it never has to live across an await point.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL, used as the base for resolving relative links
    pub url: Url,
    /// Raw HTML
    pub body: String,
}

impl FetchedPage {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Parses the body into a queryable document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Timeouts are applied per request by [`HttpSession`]; only the connect
/// timeout is fixed on the client.
///
/// # Example
///
/// ```no_run
/// use via_harvest::config::Config;
/// use via_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .connect_timeout(Duration::from_secs(config.crawler.page_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page once, classifying any failure
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Deadline for the whole request including the body
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    match client.get(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Rate-limited HTTP session shared by every pipeline stage
pub struct HttpSession {
    client: Client,
    limiter: RateLimiter,
    page_timeout: Duration,
    download_timeout: Duration,
}

impl HttpSession {
    /// Creates a session from the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            RateLimiter::from_millis(config.crawler.request_delay_ms),
            Duration::from_secs(config.crawler.page_timeout_secs),
            Duration::from_secs(config.crawler.download_timeout_secs),
        ))
    }

    /// Creates a session around an existing client and limiter
    pub fn with_client(
        client: Client,
        limiter: RateLimiter,
        page_timeout: Duration,
        download_timeout: Duration,
    ) -> Self {
        Self {
            client,
            limiter,
            page_timeout,
            download_timeout,
        }
    }

    /// Fetches an HTML page after the politeness delay
    pub async fn fetch_page(&mut self, url: &Url) -> FetchResult {
        self.limiter.wait().await;
        tracing::debug!("GET {}", url);
        fetch_url(&self.client, url.as_str(), self.page_timeout).await
    }

    /// Sends a download request after the politeness delay
    ///
    /// Returns the response once its headers arrived with a 2xx status; the
    /// caller streams the body.
    pub async fn open_download(&mut self, url: &str) -> Result<Response, HarvestError> {
        self.limiter.wait().await;
        tracing::debug!("GET {} (download)", url);

        let request = self.client.get(url).send();
        let response = match tokio::time::timeout(self.download_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(HarvestError::Transport {
                    url: url.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(HarvestError::Timeout {
                    url: url.to_string(),
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Deadline for each read while streaming a download
    pub fn download_timeout(&self) -> Duration {
        self.download_timeout
    }

    /// Number of requests sent through this session
    pub fn requests_sent(&self) -> u64 {
        self.limiter.requests()
    }
}
