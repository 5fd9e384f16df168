//! Ripple-Crawl: a concurrent, deduplicating, depth-bounded crawler
//!
//! This crate fans out one task per discovered address, claims every address
//! exactly once through a shared visited set, and streams one result per
//! visited page until the last in-flight task has finished.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Ripple-Crawl setup and teardown
///
/// A crawl itself never fails as a whole; per-address failures are reported
/// as [`FetchError`] values inside the result stream.
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Crawl supervisor failed: {0}")]
    Supervisor(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to fetch a single address
///
/// Every variant carries the address it belongs to. The error is contained to
/// the task that produced it: it is reported once in the result stream and
/// never aborts sibling tasks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not found: {address}")]
    NotFound { address: String },

    #[error("HTTP {status} for {address}")]
    Http { address: String, status: u16 },

    #[error("network error for {address}: {message}")]
    Network { address: String, message: String },

    #[error("request timeout for {address} after {attempts} attempt(s)")]
    Timeout { address: String, attempts: u32 },

    #[error("unsupported content type {content_type:?} for {address}")]
    ContentMismatch {
        address: String,
        content_type: String,
    },
}

impl FetchError {
    /// Returns the address this error belongs to
    pub fn address(&self) -> &str {
        match self {
            Self::NotFound { address }
            | Self::Http { address, .. }
            | Self::Network { address, .. }
            | Self::Timeout { address, .. }
            | Self::ContentMismatch { address, .. } => address,
        }
    }

    /// Short stable name of the error kind, used for summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Http { .. } => "http",
            Self::Network { .. } => "network",
            Self::Timeout { .. } => "timeout",
            Self::ContentMismatch { .. } => "content_mismatch",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Ripple-Crawl operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, CrawlStats, CrawlStream, Crawler, Fetcher, Page, StaticFetcher};
pub use state::{TaskState, VisitedSet};
