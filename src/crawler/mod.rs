//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - HTML parsing and scoped link extraction
//! - The crawl engine that deduplicates pages and collects documents
//! - The end-to-end harvest pipeline (crawl, then download)

mod engine;
mod fetcher;
mod parser;

pub use engine::{CrawlEngine, CrawlOutcome, PageFailure};
pub use fetcher::{
    build_http_client, send_with_retries, FetchError, FetchedPage, Fetcher, HttpFetcher,
    RetryPolicy,
};
pub use parser::LinkExtractor;

use crate::config::Config;
use crate::download::{download_all, Downloader};
use crate::output::CrawlReport;
use crate::url::parse_seed;
use crate::HarvestError;
use chrono::Utc;

/// Crawls the configured site without downloading anything
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Pages visited and documents discovered
/// * `Err(HarvestError)` - The seed was unusable or unreachable
pub async fn crawl_site(config: &Config) -> Result<CrawlOutcome, HarvestError> {
    let seed = parse_seed(&config.crawler.seed)?;
    let client = build_http_client(config)?;
    let fetcher = HttpFetcher::new(client, RetryPolicy::from_config(&config.crawler));

    CrawlEngine::from_config(fetcher, config).crawl(seed).await
}

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Create the save directory
/// 2. Crawl every in-scope page reachable from the seed
/// 3. Download every discovered document with a bounded worker pool
/// 4. Summarize the run
///
/// Download failures are counted in the report and do not fail the run.
///
/// # Example
///
/// ```no_run
/// use doc_harvester::config::load_config;
/// use doc_harvester::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = harvest(&config).await?;
/// println!("{} documents saved", report.documents_downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<CrawlReport, HarvestError> {
    let started_at = Utc::now();
    let seed = parse_seed(&config.crawler.seed)?;
    let client = build_http_client(config)?;

    let downloader = Downloader::from_config(client.clone(), config);
    downloader.prepare().await?;

    let fetcher = HttpFetcher::new(client, RetryPolicy::from_config(&config.crawler));
    let outcome = CrawlEngine::from_config(fetcher, config).crawl(seed).await?;

    tracing::info!(
        "Downloading {} documents to {}",
        outcome.documents.len(),
        downloader.save_dir().display()
    );

    let summary = download_all(
        &downloader,
        outcome.documents.iter().cloned(),
        config.output.max_concurrent_downloads as usize,
    )
    .await;

    Ok(CrawlReport::new(started_at, &outcome, &summary))
}
