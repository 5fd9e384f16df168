//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl crawler.

use anyhow::Context;
use clap::Parser;
use ripple_crawl::config::{load_config_with_hash, Config, FetcherMode};
use ripple_crawl::crawler::{build_fetcher, Crawler};
use ripple_crawl::output::{drain, print_statistics, PrintSink, SummarySink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a concurrent, deduplicating, depth-bounded crawler
///
/// Starting from one address, Ripple-Crawl fetches pages in parallel,
/// follows their links up to a maximum depth, visits every address at most
/// once and prints one line per visited page.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version)]
#[command(about = "A concurrent, depth-bounded crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the start address from the configuration
    #[arg(long, value_name = "ADDRESS")]
    start: Option<String>,

    /// Override the maximum depth from the configuration
    #[arg(long, value_name = "DEPTH")]
    depth: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(start) = cli.start {
        config.crawler.start = start;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Results go to stdout; keep logs on stderr so the two never interleave
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Ripple-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start: {}", config.crawler.start);
    println!("  Max depth: {}", config.crawler.max_depth);
    match config.crawler.max_concurrent_fetches {
        Some(limit) => println!("  Max concurrent fetches: {}", limit),
        None => println!("  Max concurrent fetches: unbounded"),
    }
    match config.crawler.fetch_timeout() {
        Some(timeout) => println!(
            "  Fetch timeout: {:?} ({} retries)",
            timeout, config.crawler.fetch_retries
        ),
        None => println!("  Fetch timeout: none"),
    }

    println!("\nFetcher:");
    match config.fetcher.mode {
        FetcherMode::Http => {
            println!("  Mode: http");
            println!("  Name: {}", config.user_agent.crawler_name);
            println!("  Version: {}", config.user_agent.crawler_version);
            println!("  Contact URL: {}", config.user_agent.contact_url);
            println!("  Contact Email: {}", config.user_agent.contact_email);
        }
        FetcherMode::Static => {
            println!("  Mode: static ({} pages)", config.pages.len());
            for page in &config.pages {
                println!("    * {} ({} links)", page.address, page.links.len());
            }
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let fetcher = build_fetcher(config).context("failed to build fetcher")?;
    let crawler = Crawler::from_config(fetcher, &config.crawler);
    let stream = crawler.crawl(config.crawler.start.clone(), config.crawler.max_depth);

    let mut printer = PrintSink::stdout();
    let mut summary = SummarySink::new();
    let stats = drain(stream, &mut [&mut printer, &mut summary])
        .await
        .context("crawl output failed")?;

    if !quiet {
        println!();
        print_statistics(&summary.into_summary(Some(stats)));
    }

    Ok(())
}
