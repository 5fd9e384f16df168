//! Output module for consuming crawl results
//!
//! This module handles:
//! - Printing results as they arrive
//! - Aggregating results into summary statistics
//! - Draining a crawl stream into any number of sinks

pub mod stats;
mod traits;

pub use stats::{print_statistics, CrawlSummary, SummarySink};
pub use traits::{OutputError, OutputResult, PrintSink, ResultSink};

use crate::crawler::{CrawlStats, CrawlStream};
use crate::RippleError;

/// Feeds every result of a crawl to each sink, then waits for completion
///
/// Results are consumed as they are produced, so the crawl never waits on
/// the sinks. Each sink's `finish` runs once the stream has closed.
///
/// # Returns
///
/// * `Ok(CrawlStats)` - The crawl completed and every sink accepted its results
/// * `Err(RippleError)` - A sink failed; the remaining results are discarded
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::{Crawler, StaticFetcher};
/// use ripple_crawl::output::{drain, PrintSink, SummarySink};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = StaticFetcher::new().with_page("start", "Home", &[]);
/// let stream = Crawler::new(Arc::new(fetcher)).crawl("start", 1);
///
/// let mut printer = PrintSink::new(Vec::new());
/// let mut summary = SummarySink::new();
/// let stats = drain(stream, &mut [&mut printer, &mut summary]).await?;
///
/// assert_eq!(stats.visited, 1);
/// assert_eq!(summary.summary().fetched, 1);
/// # Ok(())
/// # }
/// ```
pub async fn drain(
    mut stream: CrawlStream,
    sinks: &mut [&mut dyn ResultSink],
) -> Result<CrawlStats, RippleError> {
    while let Some(result) = stream.recv().await {
        for sink in sinks.iter_mut() {
            sink.accept(&result)?;
        }
    }

    for sink in sinks.iter_mut() {
        sink.finish()?;
    }

    stream.finish().await
}
