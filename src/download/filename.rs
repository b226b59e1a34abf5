use crate::config::FilenameStrategy;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Hex characters of the URL hash used by [`FilenameStrategy::HashPrefixed`]
const HASH_PREFIX_LEN: usize = 8;

/// Final non-empty path segment of a URL, as it appears in the URL
pub fn last_segment(url: &Url) -> Option<&str> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
}

/// Derives the on-disk filename for a document URL
///
/// Returns None when the URL path ends in `/` or has no segments.
///
/// # Examples
///
/// ```
/// use doc_harvester::config::FilenameStrategy;
/// use doc_harvester::download::document_filename;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/files/2023/report.pdf?v=2").unwrap();
/// assert_eq!(
///     document_filename(&url, FilenameStrategy::Basename).as_deref(),
///     Some("report.pdf")
/// );
///
/// let hashed = document_filename(&url, FilenameStrategy::HashPrefixed).unwrap();
/// assert!(hashed.ends_with("-report.pdf"));
/// ```
pub fn document_filename(url: &Url, strategy: FilenameStrategy) -> Option<String> {
    let basename = last_segment(url)?;

    match strategy {
        FilenameStrategy::Basename => Some(basename.to_string()),
        FilenameStrategy::HashPrefixed => {
            let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
            Some(format!("{}-{}", &digest[..HASH_PREFIX_LEN], basename))
        }
    }
}

/// Groups URLs that would be written to the same filename
///
/// Only filenames claimed by two or more URLs are returned.
pub fn find_collisions<'a, I>(urls: I, strategy: FilenameStrategy) -> BTreeMap<String, Vec<&'a Url>>
where
    I: IntoIterator<Item = &'a Url>,
{
    let mut by_name: BTreeMap<String, Vec<&Url>> = BTreeMap::new();
    for url in urls {
        if let Some(name) = document_filename(url, strategy) {
            by_name.entry(name).or_default().push(url);
        }
    }
    by_name.retain(|_, urls| urls.len() > 1);
    by_name
}

/// Splits URLs into groups that share a target filename
///
/// Groups keep first-seen order and each group keeps input order. A URL with
/// no derivable filename is a group of its own.
pub fn group_by_filename(urls: Vec<Url>, strategy: FilenameStrategy) -> Vec<Vec<Url>> {
    let mut groups: Vec<Vec<Url>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for url in urls {
        match document_filename(&url, strategy) {
            Some(name) => match index.get(&name) {
                Some(&i) => groups[i].push(url),
                None => {
                    index.insert(name, groups.len());
                    groups.push(vec![url]);
                }
            },
            None => groups.push(vec![url]),
        }
    }

    groups
}
