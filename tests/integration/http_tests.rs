//! Crawls against a wiremock HTTP server

use ripple_crawl::config::UserAgentConfig;
use ripple_crawl::crawler::{CrawlResult, Crawler, FetchPolicy, Fetcher, HttpFetcher};
use ripple_crawl::FetchError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(title: &str, links: &[String]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    let body = format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&UserAgentConfig::default()).expect("Failed to build client"))
}

fn index(results: Vec<CrawlResult>) -> HashMap<String, CrawlResult> {
    results
        .into_iter()
        .map(|result| (result.address.clone(), result))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index page links to two pages, a missing page and a broken page
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "Home",
            &[
                format!("{}/page1", base_url),
                "/page2".to_string(),
                "/missing".to_string(),
                "/broken".to_string(),
            ],
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // page1 links back home and on to page2
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html("Page 1", &["/".to_string(), "/page2".to_string()]))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("Page 2", &["/page3".to_string()]))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Two hops from home: beyond max depth 2
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html("Page 3", &[]))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::with_policy(fetcher(), FetchPolicy::default());
    let (results, stats) = crawler
        .crawl(format!("{}/", base_url), 2)
        .collect_all()
        .await
        .expect("Crawl failed");

    assert_eq!(results.len(), 5, "results: {:?}", results);
    let results = index(results);

    assert_eq!(results[&format!("{}/", base_url)].content(), Some("Home"));
    assert_eq!(results[&format!("{}/page1", base_url)].content(), Some("Page 1"));
    assert_eq!(results[&format!("{}/page2", base_url)].content(), Some("Page 2"));
    assert!(matches!(
        results[&format!("{}/missing", base_url)].error(),
        Some(FetchError::NotFound { .. })
    ));
    assert!(matches!(
        results[&format!("{}/broken", base_url)].error(),
        Some(FetchError::Http { status: 500, .. })
    ));
    assert!(!results.contains_key(&format!("{}/page3", base_url)));

    assert_eq!(stats.visited, 5);
    assert_eq!(stats.outstanding, 0);
}

#[tokio::test]
async fn test_non_html_response_is_content_mismatch() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("Gallery", &["/logo.png".to_string()]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(vec![0x89, b'P', b'N', b'G', 0x01, 0x02, 0xff, 0xfe], "image/png"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let image = format!("{}/logo.png", base_url);
    assert_eq!(
        fetcher().fetch(&image).await,
        Err(FetchError::ContentMismatch {
            address: image.clone(),
            content_type: "image/png".to_string(),
        })
    );

    // Inside a crawl the image is one failed result and is not followed
    let crawler = Crawler::with_policy(fetcher(), FetchPolicy::default());
    let (results, stats) = crawler
        .crawl(format!("{}/", base_url), 3)
        .collect_all()
        .await
        .expect("Crawl failed");
    let results = index(results);

    assert_eq!(results.len(), 2);
    assert_eq!(results[&format!("{}/", base_url)].content(), Some("Gallery"));
    let error = results[&image].error().expect("image must fail");
    assert_eq!(error.kind(), "content_mismatch");
    assert_eq!(stats.tasks.failed, 1);
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("Slow", &[]).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let policy = FetchPolicy {
        timeout: Some(Duration::from_millis(100)),
        retries: 1,
        max_concurrent: None,
    };
    let crawler = Crawler::with_policy(fetcher(), policy);

    let address = format!("{}/slow", mock_server.uri());
    let (results, _) = crawler.crawl(address.clone(), 1).collect_all().await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].error(),
        Some(&FetchError::Timeout {
            address,
            attempts: 2
        })
    );
}

#[tokio::test]
async fn test_http_fetcher_resolves_relative_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html(
            "Docs",
            &["intro".to_string(), "#top".to_string(), "mailto:a@b.c".to_string()],
        ))
        .mount(&mock_server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/docs/", base_url))
        .await
        .expect("fetch");

    assert_eq!(page.content, "Docs");
    assert_eq!(page.links, vec![format!("{}/docs/intro", base_url)]);
}
