//! Doc-Harvester main entry point
//!
//! This is the command-line interface for the Doc-Harvester document mirror.

use anyhow::Context;
use clap::Parser;
use doc_harvester::config::{compute_config_hash, read_config, validate, Config};
use doc_harvester::crawler::{crawl_site, harvest};
use doc_harvester::output::{print_document_list, print_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Doc-Harvester: mirror every document published under one site
///
/// Crawls all pages reachable from the seed URL without leaving its
/// scheme, host and port, collects links ending in a document extension,
/// and downloads them into the save directory.
#[derive(Parser, Debug)]
#[command(name = "doc-harvester")]
#[command(version)]
#[command(about = "Mirror all documents published under one website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page to start crawling from (overrides crawler.seed)
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Directory to save documents in (overrides output.save-dir)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Document extension, e.g. ".pdf"; repeat for several (overrides documents.extensions)
    #[arg(short, long = "extension", value_name = "EXT")]
    extensions: Vec<String>,

    /// Concurrent page fetches and downloads (overrides both config values)
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "list_only")]
    dry_run: bool,

    /// Crawl and print discovered document URLs without downloading them
    #[arg(long)]
    list_only: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = &self.seed {
            config.crawler.seed = seed.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.save_dir = dir.clone();
        }
        if !self.extensions.is_empty() {
            config.documents.extensions = self.extensions.clone();
        }
        if let Some(n) = self.concurrency {
            config.crawler.max_concurrent_pages = n;
            config.output.max_concurrent_downloads = n;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_only {
        handle_list_only(&config).await?;
    } else {
        handle_harvest(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_harvester=info,warn"),
            1 => EnvFilter::new("doc_harvester=debug,info"),
            2 => EnvFilter::new("doc_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Reads the config file (if any), applies CLI overrides, then validates
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Doc-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", config.crawler.seed);
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages
    );
    match config.crawler.page_limit() {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none"),
    }
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    match config.crawler.run_deadline() {
        Some(deadline) => println!("  Run deadline: {:?}", deadline),
        None => println!("  Run deadline: none"),
    }
    println!(
        "  Retries: {} (base delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_base_delay_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nDocument Extensions ({}):", config.documents.extensions.len());
    for extension in &config.documents.extensions {
        println!("  - {}", extension);
    }

    println!("\nOutput:");
    println!("  Save directory: {}", config.output.save_dir.display());
    println!(
        "  Max concurrent downloads: {}",
        config.output.max_concurrent_downloads
    );
    println!("  Filename strategy: {:?}", config.output.filename_strategy);

    println!("\n✓ Configuration is valid");
}

/// Handles the --list-only mode: crawl and print document URLs
async fn handle_list_only(config: &Config) -> anyhow::Result<()> {
    let outcome = crawl_site(config).await.context("Crawl failed")?;
    print_document_list(&outcome);
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} into {} (extensions: {})",
        config.crawler.seed,
        config.output.save_dir.display(),
        config.documents.extensions.join(", ")
    );

    match harvest(config).await {
        Ok(report) => {
            if report.documents_failed > 0 {
                tracing::warn!("{} documents failed to download", report.documents_failed);
            }
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
