//! Crawler coordinator - parallel, deduplicating, depth-bounded traversal
//!
//! Each claimed address is processed by its own tokio task:
//! - Check remaining depth (before touching the visited set)
//! - Claim the address in the visited set
//! - Fetch it under the fetch policy
//! - Emit exactly one result, then spawn one task per discovered link
//!
//! A supervisor task waits for the outstanding-task count to reach zero and
//! then closes the result stream.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scheduler::{FetchPolicy, Scheduler};
use crate::crawler::stream::{CrawlResult, CrawlStats, CrawlStream, ResultChannel};
use crate::crawler::tracker::{TaskGuard, TaskTracker};
use crate::state::{TaskState, VisitedSet};
use std::sync::Arc;
use std::time::Instant;

/// Parallel crawler over an injected [`Fetcher`]
///
/// A `Crawler` can run any number of crawls; each call to
/// [`Crawler::crawl`] gets its own visited set and task counter.
pub struct Crawler<F: ?Sized = dyn Fetcher> {
    fetcher: Arc<F>,
    scheduler: Scheduler,
}

impl<F> Crawler<F>
where
    F: Fetcher + ?Sized + 'static,
{
    /// Creates a crawler using the default fetch policy
    pub fn new(fetcher: Arc<F>) -> Self {
        Self::with_policy(fetcher, FetchPolicy::default())
    }

    /// Creates a crawler whose fetch policy comes from configuration
    pub fn from_config(fetcher: Arc<F>, config: &CrawlerConfig) -> Self {
        Self::with_policy(fetcher, FetchPolicy::from(config))
    }

    pub fn with_policy(fetcher: Arc<F>, policy: FetchPolicy) -> Self {
        Self {
            fetcher,
            scheduler: Scheduler::new(policy),
        }
    }

    pub fn policy(&self) -> &FetchPolicy {
        self.scheduler.policy()
    }

    /// Starts a crawl from `start`, following links up to `max_depth` levels
    ///
    /// The start address is visited with remaining depth `max_depth`; each
    /// link hop decrements it, and tasks at zero do no work. A `max_depth` of
    /// zero therefore yields an empty, already-closing stream.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_crawl::crawler::{Crawler, StaticFetcher};
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = StaticFetcher::new()
    ///     .with_page("start", "Home", &["p1", "p2"])
    ///     .with_page("p1", "Page one", &["start"])
    ///     .with_page("p2", "Page two", &[]);
    ///
    /// let crawler = Crawler::new(Arc::new(fetcher));
    /// let (results, stats) = crawler.crawl("start", 2).collect_all().await?;
    /// assert_eq!(results.len(), 3);
    /// assert_eq!(stats.outstanding, 0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn crawl(&self, start: impl Into<String>, max_depth: u32) -> CrawlStream {
        let start = start.into();
        tracing::info!("Starting crawl at {} with max depth {}", start, max_depth);

        let (results, receiver) = ResultChannel::new();
        let shared = Arc::new(CrawlShared {
            fetcher: Arc::clone(&self.fetcher),
            scheduler: self.scheduler.clone(),
            visited: VisitedSet::new(),
            tracker: TaskTracker::new(),
            results,
        });

        let started = Instant::now();

        // The root counts as outstanding before the supervisor starts waiting
        spawn_task(Arc::clone(&shared), start, max_depth);

        let supervisor = tokio::spawn(async move {
            shared.tracker.wait_idle().await;
            shared.results.close();

            let stats = CrawlStats {
                visited: shared.visited.len(),
                outstanding: shared.tracker.outstanding(),
                tasks: shared.tracker.tally(),
                elapsed: started.elapsed(),
            };
            tracing::info!(
                "Crawl completed: {} pages visited ({} fetched, {} failed) in {:?}",
                stats.visited,
                stats.tasks.fetched,
                stats.tasks.failed,
                stats.elapsed
            );
            stats
        });

        CrawlStream::new(receiver, supervisor)
    }
}

impl<F: ?Sized> Clone for Crawler<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            scheduler: self.scheduler.clone(),
        }
    }
}

/// State shared by every task of one crawl
struct CrawlShared<F: ?Sized> {
    fetcher: Arc<F>,
    scheduler: Scheduler,
    visited: VisitedSet,
    tracker: Arc<TaskTracker>,
    results: ResultChannel,
}

impl<F: ?Sized> CrawlShared<F> {
    /// Sends a result to the consumer; results for a dropped stream are discarded
    fn deliver(&self, result: CrawlResult) {
        let address = result.address.clone();
        if !self.results.emit(result) {
            tracing::trace!("Result for {} discarded, stream has no consumer", address);
        }
    }
}

/// Counts a task as outstanding, then hands it to the runtime
fn spawn_task<F>(shared: Arc<CrawlShared<F>>, address: String, remaining: u32)
where
    F: Fetcher + ?Sized + 'static,
{
    let guard = shared.tracker.enter();
    tokio::spawn(run_task(shared, guard, address, remaining));
}

/// Processes one `(address, remaining)` pair
///
/// The guard is dropped on every return path, uncounting the task once.
async fn run_task<F>(shared: Arc<CrawlShared<F>>, mut guard: TaskGuard, address: String, remaining: u32)
where
    F: Fetcher + ?Sized + 'static,
{
    guard.advance(TaskState::DepthCheck);
    if remaining == 0 {
        guard.advance(TaskState::DepthExhausted);
        tracing::trace!("Depth exhausted at {}", address);
        return;
    }

    guard.advance(TaskState::ClaimAttempt);
    if !shared.visited.claim(&address) {
        guard.advance(TaskState::AlreadyClaimed);
        tracing::trace!("Already claimed: {}", address);
        return;
    }

    guard.advance(TaskState::Fetching);
    tracing::debug!("Fetching {} (remaining depth {})", address, remaining);

    match shared.scheduler.fetch(shared.fetcher.as_ref(), &address).await {
        Ok(page) => {
            let links = page.links;
            shared.deliver(CrawlResult::success(address.as_str(), remaining, page.content));

            tracing::debug!("Found {} link(s) on {}", links.len(), address);
            for link in links {
                spawn_task(Arc::clone(&shared), link, remaining - 1);
            }
            guard.advance(TaskState::Fetched);
        }
        Err(error) => {
            tracing::warn!("Failed to fetch {}: {}", address, error);
            shared.deliver(CrawlResult::failure(address.as_str(), remaining, error));
            guard.advance(TaskState::Failed);
        }
    }
}
