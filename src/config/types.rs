use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Ripple-Crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Address the crawl starts from
    pub start: String,

    /// Remaining depth given to the start address
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Upper bound on fetches in flight at once (unbounded when absent)
    #[serde(rename = "max-concurrent-fetches", default)]
    pub max_concurrent_fetches: Option<u32>,

    /// Deadline for a single fetch attempt in milliseconds (0 disables it)
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Extra attempts made after a fetch attempt times out
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,
}

impl CrawlerConfig {
    /// Creates a crawler configuration with default fetch policy
    pub fn new(start: impl Into<String>, max_depth: u32) -> Self {
        Self {
            start: start.into(),
            max_depth,
            max_concurrent_fetches: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            fetch_retries: default_fetch_retries(),
        }
    }

    /// Per-attempt fetch deadline, or None when disabled
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

fn default_fetch_timeout_ms() -> u64 {
    30_000
}

fn default_fetch_retries() -> u32 {
    2
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "RippleCrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Which fetcher implementation backs the crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherMode {
    /// Fetch pages over HTTP and extract links from HTML
    #[default]
    Http,

    /// Serve the canned `[[pages]]` table from the configuration
    Static,
}

/// Fetcher selection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub mode: FetcherMode,
}

/// A canned page served by the static fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    /// Address of the page
    pub address: String,

    /// Page content returned on fetch
    #[serde(default)]
    pub body: String,

    /// Addresses linked from this page, in order
    #[serde(default)]
    pub links: Vec<String>,
}
