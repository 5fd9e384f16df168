//! Fetcher capability and its HTTP implementation
//!
//! The crawler only depends on the [`Fetcher`] trait: resolve one address to
//! its content and outgoing links, or fail with a [`FetchError`]. This module
//! also provides the HTTP implementation, which:
//! - Builds a client with the configured user agent string
//! - Sends GET requests and classifies the response status
//! - Only reads bodies served as `text/html`
//! - Parses HTML to extract the title and absolute links

use crate::config::UserAgentConfig;
use crate::crawler::parser::parse_html;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Content summary reported in the crawl result
    pub content: String,

    /// Addresses discovered on the page, in document order
    pub links: Vec<String>,
}

impl Page {
    pub fn new(content: impl Into<String>, links: Vec<String>) -> Self {
        Self {
            content: content.into(),
            links,
        }
    }
}

/// Resolves one address to its content and outgoing links
///
/// Implementations must be safe to call from many tasks at once. The crawler
/// treats calls as independent of each other and imposes its own per-attempt
/// deadline on top of whatever the implementation does.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<Page, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::UserAgentConfig;
/// use ripple_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent as `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Fetches pages over HTTP
///
/// # Status Mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Page` with title (or leading text) and links |
/// | HTTP 404 / 410 | `FetchError::NotFound` |
/// | Other non-success status | `FetchError::Http` |
/// | 2xx without `text/html` content type | `FetchError::ContentMismatch` |
/// | Connection, TLS or body error | `FetchError::Network` |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the user agent config
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<Page, FetchError> {
        let network_error = |e: reqwest::Error| FetchError::Network {
            address: address.to_string(),
            message: classify_network_error(&e),
        };

        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound {
                address: address.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Http {
                address: address.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            tracing::debug!("Skipping body of {} ({:?})", address, content_type);
            return Err(FetchError::ContentMismatch {
                address: address.to_string(),
                content_type,
            });
        }

        // Relative links resolve against the post-redirect URL
        let base_url = response.url().clone();
        let body = response.text().await.map_err(network_error)?;

        tracing::trace!("Fetched {} ({} bytes)", address, body.len());
        Ok(page_from_html(&body, &base_url))
    }
}

fn is_html(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}

fn page_from_html(body: &str, base_url: &Url) -> Page {
    let parsed = parse_html(body, base_url);
    Page {
        content: parsed.summary(),
        links: parsed.links,
    }
}

fn classify_network_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}
