//! Run summary
//!
//! This module condenses a crawl outcome and download summary into the counts
//! reported to the operator at the end of a run.

use crate::crawler::CrawlOutcome;
use crate::download::DownloadSummary;
use chrono::{DateTime, Utc};

/// Counts for one harvest run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages claimed and fetched (successfully or not)
    pub pages_visited: usize,

    /// Non-seed pages whose fetch failed
    pub pages_failed: usize,

    /// Distinct documents discovered
    pub documents_found: usize,

    pub documents_downloaded: usize,
    pub documents_failed: usize,
    pub bytes_downloaded: u64,
}

impl CrawlReport {
    /// Builds the report; `finished_at` is now
    pub fn new(
        started_at: DateTime<Utc>,
        outcome: &CrawlOutcome,
        downloads: &DownloadSummary,
    ) -> Self {
        Self {
            seed: outcome.seed.to_string(),
            started_at,
            finished_at: Utc::now(),
            pages_visited: outcome.visited.len(),
            pages_failed: outcome.failed_pages.len(),
            documents_found: outcome.documents.len(),
            documents_downloaded: downloads.saved.len(),
            documents_failed: downloads.failed.len(),
            bytes_downloaded: downloads.total_bytes(),
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Summary ===\n");

    println!("Seed: {}", report.seed);
    println!(
        "Started: {}  Finished: {}  ({:.1}s)",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
    println!();

    println!("Pages:");
    println!("  Visited: {}", report.pages_visited);
    println!("  Failed: {}", report.pages_failed);
    println!();

    println!("Documents:");
    println!("  Found: {}", report.documents_found);
    println!(
        "  Downloaded: {} ({} bytes)",
        report.documents_downloaded, report.bytes_downloaded
    );
    println!("  Failed: {}", report.documents_failed);
}

/// Prints every discovered document URL, one per line
pub fn print_document_list(outcome: &CrawlOutcome) {
    for url in &outcome.documents {
        println!("{}", url);
    }
    println!(
        "\n{} documents found on {} pages",
        outcome.documents.len(),
        outcome.visited.len()
    );
}
