use crate::config::{Config, FilenameStrategy};
use crate::crawler::{send_with_retries, FetchError, RetryPolicy};
use crate::download::filename::document_filename;
use crate::download::{DownloadError, SavedDocument};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Streams documents into one directory
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    save_dir: PathBuf,
    strategy: FilenameStrategy,
    retry: RetryPolicy,
}

impl Downloader {
    pub fn new(client: Client, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            save_dir: save_dir.into(),
            strategy: FilenameStrategy::default(),
            retry: RetryPolicy::none(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.output.save_dir.clone())
            .with_strategy(config.output.filename_strategy)
            .with_retry(RetryPolicy::from_config(&config.crawler))
    }

    pub fn with_strategy(mut self, strategy: FilenameStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn strategy(&self) -> FilenameStrategy {
        self.strategy
    }

    /// Creates the save directory; succeeds if it already exists
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.save_dir).await
    }

    /// Downloads one document
    ///
    /// The body is written chunk by chunk as it arrives. The response and the
    /// file are both dropped on every return path. A failure mid-transfer
    /// leaves the partial file on disk.
    pub async fn download(&self, url: &Url) -> Result<SavedDocument, DownloadError> {
        let filename =
            document_filename(url, self.strategy).ok_or_else(|| DownloadError::NoFilename {
                url: url.to_string(),
            })?;
        let path = self.save_dir.join(&filename);

        let mut response = send_with_retries(&self.client, url, &self.retry).await?;

        let io_error = |source| DownloadError::Io {
            path: path.clone(),
            source,
        };

        let mut file = File::create(&path).await.map_err(io_error)?;
        let mut bytes = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            file.write_all(&chunk).await.map_err(io_error)?;
            bytes += chunk.len() as u64;
        }

        file.flush().await.map_err(io_error)?;

        tracing::info!("Downloaded {} ({} bytes)", filename, bytes);

        Ok(SavedDocument {
            url: url.clone(),
            path,
            bytes,
        })
    }
}
