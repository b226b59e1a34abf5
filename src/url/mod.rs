//! URL handling module for Doc-Harvester
//!
//! This module provides the two URL policies the crawl is built on:
//! authority scoping (which URLs belong to the run) and document
//! classification (which in-scope URLs are downloaded instead of crawled).

mod authority;
mod classifier;

pub use authority::Authority;
pub use classifier::{Classifier, LinkKind};

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and checks a seed URL
///
/// The seed must be absolute, use http or https, and have a host, since its
/// authority becomes the scope for the whole run.
///
/// # Examples
///
/// ```
/// use doc_harvester::url::parse_seed;
///
/// let seed = parse_seed("https://www.nso.gov.pg/documents/").unwrap();
/// assert_eq!(seed.host_str(), Some("www.nso.gov.pg"));
///
/// assert!(parse_seed("ftp://example.com/").is_err());
/// assert!(parse_seed("/relative/path").is_err());
/// ```
pub fn parse_seed(seed: &str) -> UrlResult<Url> {
    let url = Url::parse(seed).map_err(|e| UrlError::Parse(format!("{}: {}", seed, e)))?;
    Authority::from_url(&url)?;
    Ok(url)
}
