//! Fetch collaborator
//!
//! The decision core never fetches pages on its own; it only asks a
//! [`Fetcher`] for robots.txt. [`HttpFetcher`] is the reqwest-backed
//! implementation used by the command-line driver and integration tests.

use crate::config::{FetchConfig, UserAgentConfig};
use crate::SieveError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed by [`HttpFetcher`]
const MAX_REDIRECTS: usize = 10;

/// A fetched response, as handed to the decision core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    /// The URL that was requested
    pub requested_url: String,

    /// The URL of the page after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Raw body bytes, if the response carried any
    pub body: Option<Vec<u8>>,
}

impl PageResponse {
    /// Creates a response whose final URL equals the requested URL
    pub fn new(url: impl Into<String>, status: u16, body: Option<Vec<u8>>) -> Self {
        let requested_url = url.into();
        Self {
            final_url: requested_url.clone(),
            requested_url,
            status,
            body,
        }
    }

    /// Sets the post-redirect URL
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }
}

/// Something that can retrieve a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`
    ///
    /// Any HTTP status is a successful fetch; `Err` means the transport failed.
    async fn fetch(&self, url: &str) -> Result<PageResponse, SieveError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts
///
/// # Example
///
/// ```no_run
/// use sumi_sieve::config::{FetchConfig, UserAgentConfig};
/// use sumi_sieve::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiSieve".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher identifying itself with the configured user agent
    pub fn new(user_agent: &UserAgentConfig, fetch: &FetchConfig) -> Result<Self, SieveError> {
        let client = build_http_client(user_agent, fetch).map_err(|source| SieveError::Http {
            url: String::new(),
            source,
        })?;
        Ok(Self { client })
    }
}

/// Maps a transport error to the crate error type
fn classify_error(url: &str, error: reqwest::Error) -> SieveError {
    if error.is_timeout() {
        SieveError::Timeout {
            url: url.to_string(),
        }
    } else {
        SieveError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PageResponse, SieveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        tracing::trace!("Fetched {} ({}, {} bytes)", final_url, status, body.len());

        Ok(PageResponse {
            requested_url: url.to_string(),
            final_url,
            status,
            body: Some(body.to_vec()),
        })
    }
}
