//! Configuration module for Doc-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) plus a seed URL
//! on the command line is a complete configuration.
//!
//! # Example
//!
//! ```no_run
//! use doc_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Saving documents to: {}", config.output.save_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DocumentsConfig, FilenameStrategy, OutputConfig, UserAgentConfig,
    DEFAULT_EXTENSIONS,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, parse_config, read_config};
pub use validation::validate;
