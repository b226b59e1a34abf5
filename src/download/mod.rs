//! Document download module
//!
//! This module saves discovered documents to disk:
//! - Deriving filenames from the last URL path segment
//! - Streaming response bodies straight into files
//! - Running downloads through a bounded worker pool where one failure never
//!   stops the others

mod downloader;
mod filename;

pub use downloader::Downloader;
pub use filename::{document_filename, find_collisions, group_by_filename, last_segment};

use crate::config::FilenameStrategy;
use crate::crawler::FetchError;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Why a single document was not saved
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Cannot derive a filename from {url}")]
    NoFilename { url: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A document written to disk
#[derive(Debug, Clone)]
pub struct SavedDocument {
    pub url: Url,
    pub path: PathBuf,
    pub bytes: u64,
}

/// A document that could not be saved
#[derive(Debug)]
pub struct DownloadFailure {
    pub url: Url,
    pub error: DownloadError,
}

/// Per-document results of a download pass
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub saved: Vec<SavedDocument>,
    pub failed: Vec<DownloadFailure>,
}

impl DownloadSummary {
    pub fn total_bytes(&self) -> u64 {
        self.saved.iter().map(|doc| doc.bytes).sum()
    }
}

/// Downloads every URL with at most `concurrency` transfers in flight
///
/// URLs that map to the same filename are downloaded one after another by a
/// single worker, so the saved file always holds one whole document: the last
/// URL of the group in input order. Collisions are logged up front when the
/// downloader keeps plain basenames.
///
/// # Example
///
/// ```no_run
/// use doc_harvester::download::{download_all, Downloader};
/// use url::Url;
///
/// # async fn example() {
/// let downloader = Downloader::new(reqwest::Client::new(), "./Documents");
/// let urls = vec![Url::parse("https://example.com/report.pdf").unwrap()];
/// let summary = download_all(&downloader, urls, 4).await;
/// println!("{} saved, {} failed", summary.saved.len(), summary.failed.len());
/// # }
/// ```
pub async fn download_all<I>(
    downloader: &Downloader,
    urls: I,
    concurrency: usize,
) -> DownloadSummary
where
    I: IntoIterator<Item = Url>,
{
    let urls: Vec<Url> = urls.into_iter().collect();

    if downloader.strategy() == FilenameStrategy::Basename {
        for (name, sources) in find_collisions(&urls, FilenameStrategy::Basename) {
            tracing::warn!(
                "{} documents share the filename {}; only one will be kept: {:?}",
                sources.len(),
                name,
                sources.iter().map(|u| u.as_str()).collect::<Vec<_>>()
            );
        }
    }

    let groups = group_by_filename(urls, downloader.strategy());

    let results: Vec<Vec<(Url, Result<SavedDocument, DownloadError>)>> = stream::iter(groups)
        .map(|group| async move {
            let mut results = Vec::with_capacity(group.len());
            for url in group {
                let result = downloader.download(&url).await;
                results.push((url, result));
            }
            results
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = DownloadSummary::default();
    for (url, result) in results.into_iter().flatten() {
        match result {
            Ok(saved) => summary.saved.push(saved),
            Err(error) => {
                tracing::warn!("Failed to download {}: {}", url, error);
                summary.failed.push(DownloadFailure { url, error });
            }
        }
    }

    summary
}
