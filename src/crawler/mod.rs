//! Crawler module for parallel page traversal
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` capability and its HTTP and canned implementations
//! - HTML parsing and link extraction
//! - Per-fetch timeout, retry and concurrency policy
//! - Task accounting and the result stream
//! - Overall crawl coordination

mod canned;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod stream;
mod tracker;

pub use canned::StaticFetcher;
pub use coordinator::Crawler;
pub use fetcher::{build_http_client, user_agent_string, Fetcher, HttpFetcher, Page};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::{FetchPolicy, Scheduler};
pub use stream::{CrawlResult, CrawlStats, CrawlStream};
pub use tracker::TaskTally;

use crate::config::{Config, FetcherMode};
use crate::RippleError;
use std::sync::Arc;

/// Builds the fetcher selected by the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Fetcher>)` - `HttpFetcher` or `StaticFetcher`
/// * `Err(RippleError)` - The HTTP client could not be built
pub fn build_fetcher(config: &Config) -> Result<Arc<dyn Fetcher>, RippleError> {
    let fetcher: Arc<dyn Fetcher> = match config.fetcher.mode {
        FetcherMode::Http => Arc::new(HttpFetcher::new(&config.user_agent)?),
        FetcherMode::Static => Arc::new(StaticFetcher::from_entries(&config.pages)),
    };
    Ok(fetcher)
}

/// Starts the crawl described by a configuration
///
/// This is the main entry point for a configured crawl. It will:
/// 1. Build the configured fetcher
/// 2. Derive the fetch policy from the crawler section
/// 3. Start crawling from `crawler.start` with `crawler.max-depth`
///
/// # Example
///
/// ```no_run
/// use ripple_crawl::config::load_config;
/// use ripple_crawl::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawl.toml"))?;
/// let (results, stats) = crawl(&config)?.collect_all().await?;
/// println!("{} results, {} visited", results.len(), stats.visited);
/// # Ok(())
/// # }
/// ```
pub fn crawl(config: &Config) -> Result<CrawlStream, RippleError> {
    let fetcher = build_fetcher(config)?;
    let crawler = Crawler::from_config(fetcher, &config.crawler);
    Ok(crawler.crawl(config.crawler.start.clone(), config.crawler.max_depth))
}
