use crate::config::DocumentsConfig;
use url::Url;

/// What the crawl does with an in-scope link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Downloadable artifact - collected, never fetched as a page
    Document,
    /// HTML page - crawled for further links
    Page,
}

/// Routes URLs to [`LinkKind::Document`] or [`LinkKind::Page`] by path suffix
///
/// Matching is case-sensitive and looks at the URL path only, so
/// `/report.pdf?download=1` is a document while `/report.PDF` is not
/// (unless `.PDF` is configured too).
#[derive(Debug, Clone)]
pub struct Classifier {
    extensions: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &DocumentsConfig) -> Self {
        Self::new(config.extensions.iter().cloned())
    }

    /// Classifies a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use doc_harvester::url::{Classifier, LinkKind};
    ///
    /// let classifier = Classifier::new([".pdf", ".docx"]);
    /// let report = Url::parse("https://example.com/files/report.pdf").unwrap();
    /// let index = Url::parse("https://example.com/files/").unwrap();
    ///
    /// assert_eq!(classifier.classify(&report), LinkKind::Document);
    /// assert_eq!(classifier.classify(&index), LinkKind::Page);
    /// ```
    pub fn classify(&self, url: &Url) -> LinkKind {
        let path = url.path();
        if self.extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            LinkKind::Document
        } else {
            LinkKind::Page
        }
    }

    pub fn is_document(&self, url: &Url) -> bool {
        self.classify(url) == LinkKind::Document
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}
