//! State module for tracking crawl progress
//!
//! A crawl run owns one [`RunContext`]: the set of pages already claimed for
//! fetching and the set of documents collected so far. Both live for a single
//! run and are never shared between runs.

mod run_context;

pub use run_context::RunContext;
