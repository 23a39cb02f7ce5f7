//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of crawling:
//! - Building HTTP clients from the shared HTTP configuration
//! - GET requests that follow redirects and report the final URL
//! - Classifying non-2xx responses as fetch failures

use crate::config::HttpConfig;
use crate::ScrapeError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A successfully fetched page, ready to be parsed
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; the base for relative links
    pub final_url: Url,
    /// HTTP status code (always 2xx)
    pub status: u16,
    /// Page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use image_scraper::config::HttpConfig;
/// use image_scraper::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches documents for the crawl engine
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a fetcher with a client built from `config`
    pub fn from_config(config: &HttpConfig) -> Result<Self, ScrapeError> {
        Ok(Self::new(build_http_client(config)?))
    }

    /// Performs a GET request and returns the page body
    ///
    /// # Errors
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Connection, timeout, redirect loop | `ScrapeError::Http` |
    /// | Non-2xx status | `ScrapeError::Status` |
    /// | Body could not be read | `ScrapeError::Http` |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!(url, final_url = %final_url, bytes = body.len(), "fetched document");

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}
