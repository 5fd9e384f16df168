//! Statistics aggregated from a crawl's result stream
//!
//! This module provides a sink that tallies results as they arrive and a
//! printer for the final summary.

use crate::crawler::{CrawlResult, CrawlStats};
use crate::output::traits::{OutputResult, ResultSink};
use std::collections::{BTreeMap, HashMap};

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Number of results received
    pub total_results: u64,

    /// Results carrying content
    pub fetched: u64,

    /// Results carrying an error
    pub failed: u64,

    /// Error kind -> count
    pub errors_by_kind: HashMap<&'static str, u64>,

    /// Remaining depth -> number of results visited at that depth
    pub depth_breakdown: BTreeMap<u32, u64>,

    /// Addresses whose fetch failed, sorted
    pub failed_addresses: Vec<String>,

    /// Task accounting reported by the crawler, once the crawl has finished
    pub crawl: Option<CrawlStats>,
}

impl CrawlSummary {
    /// Fraction of results that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_results > 0 {
            (self.fetched as f64 / self.total_results as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, result: &CrawlResult) {
        self.total_results += 1;
        *self.depth_breakdown.entry(result.depth).or_default() += 1;

        match &result.outcome {
            Ok(_) => self.fetched += 1,
            Err(error) => {
                self.failed += 1;
                *self.errors_by_kind.entry(error.kind()).or_default() += 1;
                self.failed_addresses.push(result.address.clone());
            }
        }
    }
}

/// Sink that aggregates results into a [`CrawlSummary`]
#[derive(Debug, Default)]
pub struct SummarySink {
    summary: CrawlSummary,
}

impl SummarySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Attaches the crawler's final statistics and returns the summary
    pub fn into_summary(mut self, stats: Option<CrawlStats>) -> CrawlSummary {
        self.summary.crawl = stats;
        self.summary
    }
}

impl ResultSink for SummarySink {
    fn accept(&mut self, result: &CrawlResult) -> OutputResult<()> {
        self.summary.record(result);
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.summary.failed_addresses.sort();
        Ok(())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Results: {}", summary.total_results);
    println!("  Fetched: {}", summary.fetched);
    println!("  Failed: {}", summary.failed);
    if let Some(crawl) = &summary.crawl {
        println!("  Addresses visited: {}", crawl.visited);
        println!("  Elapsed: {:.2?}", crawl.elapsed);
    }
    println!();

    if !summary.depth_breakdown.is_empty() {
        println!("Results by Remaining Depth:");
        for (depth, count) in summary.depth_breakdown.iter().rev() {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if let Some(crawl) = &summary.crawl {
        let tasks = &crawl.tasks;
        println!("Tasks ({}):", tasks.total());
        println!("  Fetched: {}", tasks.fetched);
        println!("  Failed: {}", tasks.failed);
        println!("  Already claimed: {}", tasks.already_claimed);
        println!("  Depth exhausted: {}", tasks.depth_exhausted);
        if tasks.abandoned > 0 {
            println!("  Abandoned: {}", tasks.abandoned);
        }
        println!();
    }

    if !summary.errors_by_kind.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = summary.errors_by_kind.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (kind, count) in error_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        summary.success_rate(),
        summary.fetched,
        summary.total_results
    );
}
