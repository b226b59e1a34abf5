//! Full pipeline over HTTP: crawl, then download into a temporary directory

use crate::{mount_document, mount_page};
use doc_harvester::config::{Config, FilenameStrategy};
use doc_harvester::crawler::{build_http_client, harvest};
use doc_harvester::download::{download_all, Downloader};
use doc_harvester::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(server: &MockServer, save_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.seed = format!("{}/", server.uri());
    config.crawler.max_retries = 0;
    config.output.save_dir = save_dir.to_path_buf();
    config
}

fn read(path: impl AsRef<Path>) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read downloaded file")
}

#[tokio::test]
async fn test_full_harvest_downloads_every_document() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/reports/", "/files/annual.pdf"], 1).await;
    mount_page(
        &server,
        "/reports/",
        &["q1.docx", "/files/annual.pdf", "../data/table.xlsx"],
        1,
    )
    .await;
    mount_document(&server, "/files/annual.pdf", b"%PDF-1.4 annual", 1).await;
    mount_document(&server, "/reports/q1.docx", b"PK docx", 1).await;
    mount_document(&server, "/data/table.xlsx", b"PK xlsx", 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let save_dir = dir.path().join("Documents");
    let config = create_test_config(&server, &save_dir);

    let report = harvest(&config).await.expect("Harvest failed");

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.documents_found, 3);
    assert_eq!(report.documents_downloaded, 3);
    assert_eq!(report.documents_failed, 0);

    assert_eq!(read(save_dir.join("annual.pdf")), b"%PDF-1.4 annual");
    assert_eq!(read(save_dir.join("q1.docx")), b"PK docx");
    assert_eq!(read(save_dir.join("table.xlsx")), b"PK xlsx");
}

#[tokio::test]
async fn test_download_failure_does_not_fail_run() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/ok.pdf", "/missing.pdf"], 1).await;
    mount_document(&server, "/ok.pdf", b"ok", 1).await;

    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server, dir.path());

    let report = harvest(&config).await.expect("Harvest failed");

    assert_eq!(report.documents_found, 2);
    assert_eq!(report.documents_downloaded, 1);
    assert_eq!(report.documents_failed, 1);
    assert!(dir.path().join("ok.pdf").exists());
    assert!(!dir.path().join("missing.pdf").exists());
}

#[tokio::test]
async fn test_unreachable_seed_fails_harvest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server, dir.path());

    let result = harvest(&config).await;

    assert!(matches!(result, Err(HarvestError::SeedUnreachable { .. })));
}

#[tokio::test]
async fn test_existing_save_dir_is_reused() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a.pdf"], 1).await;
    mount_document(&server, "/a.pdf", b"new", 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("keep.txt"), b"untouched").expect("Failed to seed dir");
    let config = create_test_config(&server, dir.path());

    harvest(&config).await.expect("Harvest failed");

    assert_eq!(read(dir.path().join("keep.txt")), b"untouched");
    assert_eq!(read(dir.path().join("a.pdf")), b"new");
}

#[tokio::test]
async fn test_hash_prefixed_names_keep_same_basename_documents() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/2022/report.pdf", "/2023/report.pdf"], 1).await;
    mount_document(&server, "/2022/report.pdf", b"2022", 1).await;
    mount_document(&server, "/2023/report.pdf", b"2023", 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(&server, dir.path());
    config.output.filename_strategy = FilenameStrategy::HashPrefixed;

    let report = harvest(&config).await.expect("Harvest failed");
    assert_eq!(report.documents_downloaded, 2);

    let mut contents: Vec<Vec<u8>> = std::fs::read_dir(dir.path())
        .expect("Failed to list save dir")
        .map(|entry| read(entry.expect("Bad dir entry").path()))
        .collect();
    contents.sort();
    assert_eq!(contents, vec![b"2022".to_vec(), b"2023".to_vec()]);
}

#[tokio::test]
async fn test_same_basename_documents_leave_one_whole_file() {
    let server = MockServer::start().await;
    let large = vec![b'A'; 4 * 1024 * 1024];
    let small = b"BBBBBBBBBB".to_vec();

    mount_page(&server, "/", &["/2022/report.pdf", "/2023/report.pdf"], 1).await;
    mount_document(&server, "/2022/report.pdf", &large, 1).await;
    mount_document(&server, "/2023/report.pdf", &small, 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&server, dir.path());
    assert_eq!(config.output.filename_strategy, FilenameStrategy::Basename);
    assert!(config.output.max_concurrent_downloads > 1);

    let report = harvest(&config).await.expect("Harvest failed");
    assert_eq!(report.documents_downloaded, 2);

    // Documents are downloaded in URL order, so the 2023 report is written last
    assert_eq!(read(dir.path().join("report.pdf")), small);
}

#[tokio::test]
async fn test_colliding_downloads_never_interleave() {
    let server = MockServer::start().await;
    let large = vec![b'A'; 1024 * 1024];
    let small = b"BBBBBBBBBB".to_vec();

    mount_document(&server, "/2022/report.pdf", &large, 10).await;
    mount_document(&server, "/2023/report.pdf", &small, 10).await;

    let base = Url::parse(&server.uri()).expect("Failed to parse base URL");
    let urls = vec![
        base.join("/2022/report.pdf").expect("join"),
        base.join("/2023/report.pdf").expect("join"),
    ];
    let client = build_http_client(&Config::default()).expect("Failed to build client");

    for _ in 0..10 {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let downloader = Downloader::new(client.clone(), dir.path());

        let summary = download_all(&downloader, urls.clone(), 4).await;

        assert_eq!(summary.saved.len(), 2);
        assert_eq!(read(dir.path().join("report.pdf")), small);
    }
}

#[tokio::test]
async fn test_download_all_reports_each_document() {
    let server = MockServer::start().await;
    mount_document(&server, "/one.pdf", b"1", 1).await;
    mount_document(&server, "/two.pdf", b"22", 1).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let client = build_http_client(&Config::default()).expect("Failed to build client");
    let downloader = Downloader::new(client, dir.path());

    let base = Url::parse(&server.uri()).expect("Failed to parse base URL");
    let urls = vec![
        base.join("/one.pdf").expect("join"),
        base.join("/two.pdf").expect("join"),
        base.join("/folder/").expect("join"),
    ];

    let summary = download_all(&downloader, urls, 2).await;

    assert_eq!(summary.saved.len(), 2);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.total_bytes(), 3);
}
