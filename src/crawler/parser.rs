//! HTML link extraction
//!
//! Turns a page body into the absolute, in-scope URLs of its `<a href>`
//! anchors, in source order.
//!
//! # Link Extraction Rules
//!
//! **Include:**
//! - `<a href="...">` anywhere in the document, resolved against the page URL
//!
//! **Exclude:**
//! - Hrefs that cannot be resolved (silently; one bad anchor never aborts a crawl)
//! - Fragment-only hrefs (`#section`), which address the page being parsed
//! - Anything outside the run's authority, including `mailto:`, `javascript:`
//!   and other non-http(s) schemes

use crate::url::Authority;
use scraper::{Html, Selector};
use url::Url;

/// Extracts in-scope links, bound to one run's authority
///
/// The authority is fixed when the extractor is built and never recomputed per
/// page, so a redirect to another host cannot widen the crawl.
#[derive(Debug)]
pub struct LinkExtractor {
    scope: Authority,
    anchors: Option<Selector>,
}

impl LinkExtractor {
    pub fn new(scope: Authority) -> Self {
        Self {
            scope,
            anchors: Selector::parse("a[href]").ok(),
        }
    }

    /// Lazily yields the in-scope links of a parsed document
    ///
    /// # Example
    ///
    /// ```
    /// use doc_harvester::crawler::LinkExtractor;
    /// use doc_harvester::url::Authority;
    /// use scraper::Html;
    /// use url::Url;
    ///
    /// let page = Url::parse("https://example.com/docs/").unwrap();
    /// let extractor = LinkExtractor::new(Authority::from_url(&page).unwrap());
    /// let html = Html::parse_document(r#"<a href="a.pdf">A</a><a href="https://other.org/">B</a>"#);
    ///
    /// let links: Vec<Url> = extractor.links(&html, &page).collect();
    /// assert_eq!(links, vec![Url::parse("https://example.com/docs/a.pdf").unwrap()]);
    /// ```
    pub fn links<'a>(
        &'a self,
        document: &'a Html,
        page_url: &'a Url,
    ) -> impl Iterator<Item = Url> + 'a {
        self.anchors
            .iter()
            .flat_map(move |selector| document.select(selector))
            .filter_map(|element| element.value().attr("href"))
            .filter_map(move |href| resolve_link(href, page_url))
            .filter(move |url| self.scope.contains(url))
    }

    /// Parses `html` and collects its in-scope links
    pub fn extract_links(&self, html: &str, page_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        self.links(&document, page_url).collect()
    }
}

/// Resolves an href against the page URL
///
/// Returns None for empty, fragment-only and unresolvable hrefs.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping malformed link {:?} on {}: {}", href, base_url, e);
            None
        }
    }
}
