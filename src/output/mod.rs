//! Output module for reporting harvest results
//!
//! This module turns a finished run into operator-facing output: the summary
//! counts printed at the end of a harvest and the plain document listing used
//! by `--list-only`.

mod stats;

pub use stats::{print_document_list, print_report, CrawlReport};
