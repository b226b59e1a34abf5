//! Integration tests for Doc-Harvester
//!
//! These tests use wiremock to serve a small site and exercise the crawl and
//! download phases over real HTTP.

mod crawl_tests;
mod harvest_tests;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds an HTML page whose body is one anchor per href
pub fn page_with_links(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>Test</title></head><body>{}</body></html>",
        anchors
    )
}

/// Mounts an HTML page at `route` that must be requested exactly `times` times
pub async fn mount_page(server: &MockServer, route: &str, hrefs: &[&str], times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page_with_links(hrefs), "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts a binary document at `route`
pub async fn mount_document(server: &MockServer, route: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .insert_header("content-type", "application/octet-stream"),
        )
        .expect(times)
        .mount(server)
        .await;
}
