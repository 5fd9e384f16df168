//! Fetcher that serves canned pages from memory
//!
//! Lets a crawl run against a fixed link graph with deterministic responses,
//! either built in code or loaded from the `[[pages]]` table of a config file.

use crate::config::PageEntry;
use crate::crawler::fetcher::{Fetcher, Page};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory `address -> page` table
///
/// Unknown addresses fail with [`FetchError::NotFound`].
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::StaticFetcher;
///
/// let fetcher = StaticFetcher::new()
///     .with_page("start", "Home", &["p1", "p2"])
///     .with_page("p1", "Page one", &["start"]);
/// assert_eq!(fetcher.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Page>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticFetcher::insert`]
    pub fn with_page(mut self, address: &str, content: &str, links: &[&str]) -> Self {
        self.insert(
            address,
            Page::new(content, links.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    /// Adds or replaces the page served for `address`
    pub fn insert(&mut self, address: impl Into<String>, page: Page) {
        self.pages.insert(address.into(), page);
    }

    /// Builds a fetcher from configured page entries
    pub fn from_entries(entries: &[PageEntry]) -> Self {
        let pages = entries
            .iter()
            .map(|entry| {
                (
                    entry.address.clone(),
                    Page::new(entry.body.clone(), entry.links.clone()),
                )
            })
            .collect();
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, address: &str) -> Result<Page, FetchError> {
        self.pages
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                address: address.to_string(),
            })
    }
}
