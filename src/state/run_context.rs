use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
struct CrawlSets {
    visited: HashSet<Url>,
    documents: HashSet<Url>,
}

/// Visited and document sets for one crawl run
///
/// Both sets only grow. A page enters `visited` through [`claim_page`], which
/// tests and inserts under one lock acquisition, so two tasks that discover the
/// same page can never both fetch it. The lock is never held across I/O.
///
/// [`claim_page`]: RunContext::claim_page
#[derive(Debug, Default)]
pub struct RunContext {
    sets: Mutex<CrawlSets>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CrawlSets> {
        // The sets stay consistent even if a holder panicked mid-insert
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks a page as visited
    ///
    /// Returns `true` if the caller now owns the fetch of this page, `false` if
    /// it was already claimed. Documents are refused so the sets stay disjoint.
    pub fn claim_page(&self, url: &Url) -> bool {
        let mut sets = self.lock();
        if sets.documents.contains(url) {
            return false;
        }
        sets.visited.insert(url.clone())
    }

    /// Adds a document; returns `false` if it was already collected
    ///
    /// A URL already visited as a page is refused so the sets stay disjoint.
    pub fn record_document(&self, url: Url) -> bool {
        let mut sets = self.lock();
        if sets.visited.contains(&url) {
            return false;
        }
        sets.documents.insert(url)
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.lock().visited.contains(url)
    }

    pub fn is_document(&self, url: &Url) -> bool {
        self.lock().documents.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    /// Copies both sets out, sorted, as `(visited, documents)`
    pub fn snapshot(&self) -> (BTreeSet<Url>, BTreeSet<Url>) {
        let sets = self.lock();
        (
            sets.visited.iter().cloned().collect(),
            sets.documents.iter().cloned().collect(),
        )
    }
}
