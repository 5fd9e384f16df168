//! Scheduler wrapping every fetch in the crawl's fetch policy
//!
//! This module handles:
//! - Optional global concurrency limiting via a semaphore
//! - A deadline on each fetch attempt
//! - Retrying attempts that hit the deadline, up to a fixed count

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{Fetcher, Page};
use crate::FetchError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// How a single address is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Deadline for one attempt; None waits indefinitely
    pub timeout: Option<Duration>,

    /// Extra attempts after a timed-out attempt
    pub retries: u32,

    /// Upper bound on fetches in flight across the whole crawl
    pub max_concurrent: Option<usize>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            retries: 2,
            max_concurrent: None,
        }
    }
}

impl FetchPolicy {
    /// Policy with no deadline, no retries and no concurrency bound
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            retries: 0,
            max_concurrent: None,
        }
    }

    /// Total number of attempts made before giving up on timeouts
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl From<&CrawlerConfig> for FetchPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            timeout: config.fetch_timeout(),
            retries: config.fetch_retries,
            max_concurrent: config.max_concurrent_fetches.map(|n| n as usize),
        }
    }
}

/// Applies a [`FetchPolicy`] to fetches issued by crawl tasks
///
/// Cloning is cheap; clones share the same concurrency permits.
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: FetchPolicy,
    permits: Option<Arc<Semaphore>>,
}

impl Scheduler {
    pub fn new(policy: FetchPolicy) -> Self {
        let permits = policy
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS))));

        Self { policy, permits }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Number of fetches that may start right now, if bounded
    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(|s| s.available_permits())
    }

    /// Fetches one address under the policy
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Attempt succeeds | Return the page |
    /// | Attempt fails | Return the error immediately, no retry |
    /// | Attempt exceeds deadline | Abandon it and retry while attempts remain |
    /// | Every attempt timed out | `FetchError::Timeout` |
    ///
    /// A concurrency permit, when configured, is held across all attempts.
    pub async fn fetch<F>(&self, fetcher: &F, address: &str) -> Result<Page, FetchError>
    where
        F: Fetcher + ?Sized,
    {
        // The semaphore is never closed, so acquisition only fails if it were
        let _permit = match &self.permits {
            Some(permits) => permits.clone().acquire_owned().await.ok(),
            None => None,
        };

        let Some(limit) = self.policy.timeout else {
            return fetcher.fetch(address).await;
        };

        let attempts = self.policy.max_attempts();
        for attempt in 1..=attempts {
            match tokio::time::timeout(limit, fetcher.fetch(address)).await {
                Ok(result) => return result,
                Err(_) if attempt < attempts => {
                    tracing::warn!(
                        "Fetch of {} timed out after {:?}, retrying ({} left)",
                        address,
                        limit,
                        attempts - attempt
                    );
                }
                Err(_) => {}
            }
        }

        tracing::warn!(
            "Fetch of {} timed out {} time(s), giving up",
            address,
            attempts
        );
        Err(FetchError::Timeout {
            address: address.to_string(),
            attempts,
        })
    }
}
