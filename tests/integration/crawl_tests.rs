//! End-to-end crawls over canned and synthetic link graphs

use async_trait::async_trait;
use futures::StreamExt;
use ripple_crawl::config::parse_config;
use ripple_crawl::crawler::{
    crawl, CrawlResult, Crawler, FetchPolicy, Fetcher, Page, StaticFetcher,
};
use ripple_crawl::output::{drain, PrintSink, SummarySink};
use ripple_crawl::FetchError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn unbounded(fetcher: StaticFetcher) -> Crawler<StaticFetcher> {
    Crawler::with_policy(Arc::new(fetcher), FetchPolicy::unbounded())
}

/// Indexes results by address, failing on any duplicate
fn index(results: Vec<CrawlResult>) -> HashMap<String, CrawlResult> {
    let mut map = HashMap::new();
    for result in results {
        let address = result.address.clone();
        assert!(
            map.insert(address.clone(), result).is_none(),
            "duplicate result for {}",
            address
        );
    }
    map
}

#[tokio::test]
async fn test_golang_demo_graph() {
    let config = parse_config(include_str!("../../demos/golang.toml")).expect("demo config");

    let (results, stats) = crawl(&config)
        .expect("crawl starts")
        .collect_all()
        .await
        .expect("crawl completes");
    let results = index(results);

    assert_eq!(results.len(), 5);
    assert_eq!(
        results["https://golang.org/"].content(),
        Some("The Go Programming Language")
    );
    assert_eq!(results["https://golang.org/pkg/fmt/"].content(), Some("Package fmt"));
    assert_eq!(results["https://golang.org/pkg/os/"].content(), Some("Package os"));
    assert_eq!(
        results["https://golang.org/cmd/"].error(),
        Some(&FetchError::NotFound {
            address: "https://golang.org/cmd/".to_string()
        })
    );

    assert_eq!(stats.visited, 5);
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.tasks.fetched, 4);
    assert_eq!(stats.tasks.failed, 1);
}

#[tokio::test]
async fn test_demo_graph_printed_output() {
    let config = parse_config(include_str!("../../demos/golang.toml")).expect("demo config");
    let stream = crawl(&config).expect("crawl starts");

    let mut printer = PrintSink::new(Vec::new());
    let mut summary = SummarySink::new();
    drain(stream, &mut [&mut printer, &mut summary])
        .await
        .expect("drain");

    let output = String::from_utf8(printer.into_inner()).unwrap();
    let mut lines: Vec<&str> = output.lines().collect();
    lines.sort();

    assert_eq!(
        lines,
        vec![
            "found: https://golang.org/ \"The Go Programming Language\"",
            "found: https://golang.org/pkg/ \"Packages\"",
            "found: https://golang.org/pkg/fmt/ \"Package fmt\"",
            "found: https://golang.org/pkg/os/ \"Package os\"",
            "not found: https://golang.org/cmd/",
        ]
    );
    assert_eq!(summary.summary().errors_by_kind["not_found"], 1);
}

#[tokio::test]
async fn test_back_link_scenario() {
    let fetcher = StaticFetcher::new()
        .with_page("start", "Home", &["p1", "p2"])
        .with_page("p1", "Page one", &["start"])
        .with_page("p2", "Page two", &[]);

    let mut stream = unbounded(fetcher).crawl("start", 2);

    let mut seen = Vec::new();
    while let Some(result) = stream.recv().await {
        seen.push(result.address);
    }
    // Closed for good
    assert!(stream.recv().await.is_none());

    seen.sort();
    assert_eq!(seen, vec!["p1", "p2", "start"]);
    assert_eq!(stream.finish().await.unwrap().outstanding, 0);
}

#[tokio::test]
async fn test_zero_depth_closes_immediately() {
    let fetcher = StaticFetcher::new().with_page("start", "Home", &["p1"]);

    let results: Vec<CrawlResult> = unbounded(fetcher).crawl("start", 0).collect().await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_depth_boundary() {
    // Chain of ten pages: start -> c1 -> ... -> c9
    let mut fetcher = StaticFetcher::new();
    for i in 0..10 {
        let address = if i == 0 { "start".to_string() } else { format!("c{}", i) };
        let links = if i < 9 { vec![format!("c{}", i + 1)] } else { vec![] };
        fetcher.insert(address, Page::new(format!("page {}", i), links));
    }
    let crawler = unbounded(fetcher);

    for max_depth in 1..=10u32 {
        let (results, _) = crawler.crawl("start", max_depth).collect_all().await.unwrap();
        let results = index(results);

        // Page k links away from start is fetched iff k < max_depth
        assert_eq!(results.len(), max_depth as usize, "max_depth {}", max_depth);
        let last = max_depth - 1;
        if last > 0 {
            assert!(results.contains_key(&format!("c{}", last)));
        }
        assert!(!results.contains_key(&format!("c{}", max_depth)));
    }
}

#[tokio::test]
async fn test_error_child_is_not_followed() {
    // "b" fails, so "c" (only reachable through a page "b" would have
    // served) must never appear
    let fetcher = StaticFetcher::new().with_page("a", "A", &["b"]);

    let (results, _) = unbounded(fetcher).crawl("a", 10).collect_all().await.unwrap();
    let results = index(results);

    assert_eq!(results.len(), 2);
    assert!(results["a"].is_success());
    assert!(results["b"].error().is_some());
}

/// Never answers for addresses starting with "hang"
struct HangingFetcher {
    inner: StaticFetcher,
}

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(&self, address: &str) -> Result<Page, FetchError> {
        if address.starts_with("hang") {
            futures::future::pending::<()>().await;
        }
        self.inner.fetch(address).await
    }
}

#[tokio::test]
async fn test_hung_fetch_times_out_without_blocking_crawl() {
    let fetcher = HangingFetcher {
        inner: StaticFetcher::new()
            .with_page("a", "A", &["hang1", "b"])
            .with_page("b", "B", &[]),
    };
    let policy = FetchPolicy {
        timeout: Some(Duration::from_millis(25)),
        retries: 1,
        max_concurrent: None,
    };

    let crawler = Crawler::with_policy(Arc::new(fetcher), policy);
    let (results, stats) = tokio::time::timeout(
        Duration::from_secs(5),
        crawler.crawl("a", 3).collect_all(),
    )
    .await
    .expect("crawl must finish despite a hung fetch")
    .unwrap();
    let results = index(results);

    assert_eq!(results.len(), 3);
    assert_eq!(
        results["hang1"].error(),
        Some(&FetchError::Timeout {
            address: "hang1".to_string(),
            attempts: 2
        })
    );
    assert!(results["b"].is_success());
    assert_eq!(stats.outstanding, 0);
}

/// Binary tree of depth `levels`, addresses "n<index>"
struct TreeFetcher {
    nodes: usize,
}

#[async_trait]
impl Fetcher for TreeFetcher {
    async fn fetch(&self, address: &str) -> Result<Page, FetchError> {
        let index: usize = address[1..].parse().map_err(|_| FetchError::NotFound {
            address: address.to_string(),
        })?;
        let links = [2 * index + 1, 2 * index + 2]
            .into_iter()
            .filter(|child| *child < self.nodes)
            .map(|child| format!("n{}", child))
            .collect();
        Ok(Page::new(address, links))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_results_buffer_while_consumer_is_idle() {
    let crawler = Crawler::with_policy(
        Arc::new(TreeFetcher { nodes: 1023 }),
        FetchPolicy::unbounded(),
    );

    let stream = crawler.crawl("n0", 10);

    // Nobody reads while the crawl runs; producers must not block
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (results, stats) = stream.collect_all().await.unwrap();
    assert_eq!(index(results).len(), 1023);
    assert_eq!(stats.tasks.fetched, 1023);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_finish_without_reading() {
    let crawler = Crawler::with_policy(
        Arc::new(TreeFetcher { nodes: 255 }),
        FetchPolicy::unbounded(),
    );

    let stats = crawler.crawl("n0", 8).finish().await.unwrap();
    assert_eq!(stats.visited, 255);
    assert_eq!(stats.outstanding, 0);
}
