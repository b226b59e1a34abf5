use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Document extensions used when the configuration does not list any
pub const DEFAULT_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".xlsx"];

/// Main configuration structure for Doc-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page the crawl starts from; its authority bounds the whole run
    pub seed: String,

    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent-pages")]
    pub max_concurrent_pages: u32,

    /// Stop claiming new pages after this many (0 = unlimited)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Deadline for the whole crawl phase in seconds (0 = none)
    #[serde(rename = "run-deadline-secs")]
    pub run_deadline_secs: u64,

    /// Retries for transient failures (timeouts, connect errors, 5xx, 429)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds, doubled on each further attempt
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_concurrent_pages: 4,
            max_pages: 0,
            fetch_timeout_secs: 30,
            connect_timeout_secs: 10,
            run_deadline_secs: 0,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn run_deadline(&self) -> Option<Duration> {
        (self.run_deadline_secs > 0).then(|| Duration::from_secs(self.run_deadline_secs))
    }

    pub fn page_limit(&self) -> Option<usize> {
        (self.max_pages > 0).then_some(self.max_pages as usize)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Which links count as downloadable documents
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Case-sensitive path suffixes, each starting with '.'
    pub extensions: Vec<String>,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// How a document URL becomes a filename on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameStrategy {
    /// Last path segment as-is; documents sharing a basename overwrite each other
    #[default]
    Basename,
    /// Last path segment prefixed with a short SHA-256 of the full URL
    HashPrefixed,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloaded documents are written to
    #[serde(rename = "save-dir")]
    pub save_dir: PathBuf,

    /// Maximum number of document downloads in flight at once
    #[serde(rename = "max-concurrent-downloads")]
    pub max_concurrent_downloads: u32,

    #[serde(rename = "filename-strategy")]
    pub filename_strategy: FilenameStrategy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("./Documents"),
            max_concurrent_downloads: 4,
            filename_strategy: FilenameStrategy::Basename,
        }
    }
}
