//! Integration tests for the crawler
//!
//! `crawl_tests` drives full crawls through in-memory fetchers;
//! `http_tests` uses wiremock to serve real HTML over HTTP.

mod crawl_tests;
mod http_tests;
