//! Crawl phase over HTTP: traversal, deduplication and scoping

use crate::{mount_document, mount_page};
use doc_harvester::config::Config;
use doc_harvester::crawler::{build_http_client, CrawlEngine, HttpFetcher, RetryPolicy};
use doc_harvester::url::Classifier;
use doc_harvester::HarvestError;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(concurrency: usize, retry: RetryPolicy) -> CrawlEngine<HttpFetcher> {
    let client = build_http_client(&Config::default()).expect("Failed to build client");
    CrawlEngine::new(
        HttpFetcher::new(client, retry),
        Classifier::new([".pdf", ".docx", ".xlsx"]),
    )
    .with_max_concurrent_pages(concurrency)
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse base URL")
}

fn urls(server: &MockServer, paths: &[&str]) -> BTreeSet<Url> {
    let base = seed(server);
    paths
        .iter()
        .map(|p| base.join(p).expect("Failed to join path"))
        .collect()
}

#[tokio::test]
async fn test_seed_without_anchors() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &[], 1).await;

    let outcome = engine(1, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited, urls(&server, &["/"]));
    assert!(outcome.documents.is_empty());
}

#[tokio::test]
async fn test_cycle_visits_each_page_once() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a"], 1).await;
    mount_page(&server, "/a", &["/"], 1).await;

    let outcome = engine(1, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited, urls(&server, &["/", "/a"]));
    // Mock expectations (one request each) are verified when `server` drops
}

#[tokio::test]
async fn test_shared_document_collected_once_and_never_crawled() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/report.pdf", "/b"], 1).await;
    mount_page(&server, "/b", &["report.pdf"], 1).await;
    mount_document(&server, "/report.pdf", b"%PDF", 0).await;

    let outcome = engine(2, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.documents, urls(&server, &["/report.pdf"]));
    assert_eq!(outcome.visited, urls(&server, &["/", "/b"]));
}

#[tokio::test]
async fn test_other_domain_is_out_of_scope() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &[
            "https://other-domain.example/x",
            "https://other-domain.example/y.pdf",
        ],
        1,
    )
    .await;

    let outcome = engine(1, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited, urls(&server, &["/"]));
    assert!(outcome.documents.is_empty());
}

#[tokio::test]
async fn test_failed_page_abandons_only_its_branch() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/broken", "/sibling"], 1).await;
    mount_page(&server, "/sibling", &["/found.docx"], 1).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = engine(1, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited, urls(&server, &["/", "/broken", "/sibling"]));
    assert_eq!(outcome.documents, urls(&server, &["/found.docx"]));
    assert_eq!(outcome.failed_pages.len(), 1);
}

#[tokio::test]
async fn test_missing_seed_is_unreachable() {
    let server = MockServer::start().await;

    let result = engine(1, RetryPolicy::none()).crawl(seed(&server)).await;

    assert!(matches!(result, Err(HarvestError::SeedUnreachable { .. })));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/a.pdf"], 1).await;

    let retry = RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(10),
    };
    let outcome = engine(1, retry)
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.documents, urls(&server, &["/a.pdf"]));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/gone"], 1).await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(10),
    };
    let outcome = engine(1, retry)
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.failed_pages.len(), 1);
}

#[tokio::test]
async fn test_non_html_page_body_not_parsed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/feed"], 1).await;

    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/hidden">not html</a>"#)
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = engine(1, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited, urls(&server, &["/", "/feed"]));
}

#[tokio::test]
async fn test_wide_site_fetches_each_page_once_concurrently() {
    let server = MockServer::start().await;
    let pages: Vec<String> = (0..12).map(|i| format!("/p{}", i)).collect();
    let hrefs: Vec<&str> = pages.iter().map(String::as_str).collect();

    mount_page(&server, "/", &hrefs, 1).await;
    for page in &pages {
        // Every page links back to the seed and to all its siblings
        let mut links = hrefs.clone();
        links.push("/");
        links.push("/all.xlsx");
        mount_page(&server, page, &links, 1).await;
    }

    let outcome = engine(6, RetryPolicy::none())
        .crawl(seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(outcome.visited.len(), 13);
    assert_eq!(outcome.documents, urls(&server, &["/all.xlsx"]));
    assert!(outcome.visited.is_disjoint(&outcome.documents));
}
