//! Crawl engine - traversal and deduplication
//!
//! The engine walks the page graph reachable from a seed with an explicit LIFO
//! worklist instead of recursion:
//! - A page is claimed in the run's [`RunContext`] when it is popped, before any
//!   of its links are explored, so cycles end at the claim
//! - Claimed pages are fetched concurrently on a `JoinSet`, bounded by
//!   `max_concurrent_pages`
//! - Each fetched page's in-scope links are routed by the [`Classifier`]:
//!   documents into the document set, pages onto the worklist
//!
//! Children are pushed in reverse source order so the first anchor is popped
//! first; with one page in flight this visits pages in the same order as a
//! recursive depth-first walk.

use crate::config::Config;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::LinkExtractor;
use crate::state::RunContext;
use crate::url::{Authority, Classifier, LinkKind};
use crate::HarvestError;
use futures::FutureExt;
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// A page whose fetch failed; its links were never explored
#[derive(Debug)]
pub struct PageFailure {
    pub url: Url,
    pub error: FetchError,
}

/// Result of a finished crawl
#[derive(Debug)]
pub struct CrawlOutcome {
    pub seed: Url,

    /// Every page claimed for fetching, including the ones that failed
    pub visited: BTreeSet<Url>,

    /// Every document discovered, each once
    pub documents: BTreeSet<Url>,

    /// Non-seed pages whose fetch failed
    pub failed_pages: Vec<PageFailure>,
}

/// What a page task hands back to the coordinator loop
struct Explored {
    url: Url,
    result: Result<Vec<Url>, FetchError>,
}

/// Shared, read-only pieces each page task needs
struct PageTask<F> {
    fetcher: Arc<F>,
    extractor: Arc<LinkExtractor>,
    classifier: Arc<Classifier>,
    context: Arc<RunContext>,
}

impl<F> Clone for PageTask<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            classifier: Arc::clone(&self.classifier),
            context: Arc::clone(&self.context),
        }
    }
}

impl<F: Fetcher> PageTask<F> {
    /// Runs [`explore`](Self::explore), turning a panic into a failed page
    async fn explore_caught(self, url: Url) -> Explored {
        let page = url.clone();
        match AssertUnwindSafe(self.explore(url)).catch_unwind().await {
            Ok(explored) => explored,
            Err(payload) => Explored {
                result: Err(FetchError::Panicked {
                    url: page.to_string(),
                    message: panic_message(payload.as_ref()),
                }),
                url: page,
            },
        }
    }

    /// Fetches one claimed page and routes its links
    ///
    /// Documents go straight into the document set. Returns the page links
    /// not yet visited; they are claimed later, when popped.
    async fn explore(self, url: Url) -> Explored {
        let result = match self.fetcher.fetch_page(&url).await {
            Ok(page) if !page.is_html() => Ok(Vec::new()),
            Ok(page) => {
                let links = self.extractor.extract_links(&page.body, &page.url);
                Ok(self.route_links(links))
            }
            Err(e) => Err(e),
        };

        Explored { url, result }
    }

    fn route_links(&self, links: Vec<Url>) -> Vec<Url> {
        let mut pages = Vec::new();

        for link in links {
            match self.classifier.classify(&link) {
                LinkKind::Document => {
                    if self.context.record_document(link.clone()) {
                        tracing::debug!("Found document: {}", link);
                    }
                }
                LinkKind::Page => {
                    if !self.context.is_visited(&link) {
                        pages.push(link);
                    }
                }
            }
        }

        pages
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Drives one or more crawl runs over a [`Fetcher`]
///
/// Every call to [`crawl`](CrawlEngine::crawl) gets a fresh [`RunContext`], so
/// one engine can run repeatedly or concurrently without runs sharing state.
pub struct CrawlEngine<F> {
    fetcher: Arc<F>,
    classifier: Arc<Classifier>,
    max_concurrent_pages: usize,
    max_pages: Option<usize>,
    deadline: Option<Duration>,
}

impl<F: Fetcher + 'static> CrawlEngine<F> {
    /// Creates an engine that fetches one page at a time, without limits
    pub fn new(fetcher: F, classifier: Classifier) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            classifier: Arc::new(classifier),
            max_concurrent_pages: 1,
            max_pages: None,
            deadline: None,
        }
    }

    /// Creates an engine with the concurrency, page limit and deadline from `config`
    pub fn from_config(fetcher: F, config: &Config) -> Self {
        Self::new(fetcher, Classifier::from_config(&config.documents))
            .with_max_concurrent_pages(config.crawler.max_concurrent_pages as usize)
            .with_max_pages(config.crawler.page_limit())
            .with_deadline(config.crawler.run_deadline())
    }

    pub fn with_max_concurrent_pages(mut self, max: usize) -> Self {
        self.max_concurrent_pages = max.max(1);
        self
    }

    pub fn with_max_pages(mut self, max: Option<usize>) -> Self {
        self.max_pages = max;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Crawls every in-scope page reachable from `seed`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Traversal finished; failed non-seed pages are listed
    /// * `Err(HarvestError::SeedUnreachable)` - The seed itself could not be fetched
    /// * `Err(HarvestError::SeedIsDocument)` - The seed classifies as a document
    /// * `Err(HarvestError::DeadlineExceeded)` - The configured deadline expired
    pub async fn crawl(&self, seed: Url) -> Result<CrawlOutcome, HarvestError> {
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, self.traverse(seed))
                .await
                .map_err(|_| HarvestError::DeadlineExceeded { limit })?,
            None => self.traverse(seed).await,
        }
    }

    async fn traverse(&self, seed: Url) -> Result<CrawlOutcome, HarvestError> {
        let scope = Authority::from_url(&seed)?;

        if self.classifier.is_document(&seed) {
            return Err(HarvestError::SeedIsDocument {
                url: seed.to_string(),
            });
        }

        tracing::info!("Crawling {} (scope {})", seed, scope);

        let context = Arc::new(RunContext::new());
        let task = PageTask {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::new(LinkExtractor::new(scope)),
            classifier: Arc::clone(&self.classifier),
            context: Arc::clone(&context),
        };

        let mut frontier = vec![seed.clone()];
        let mut in_flight = JoinSet::new();
        let mut failed_pages = Vec::new();
        let mut pages_fetched = 0usize;
        let start_time = Instant::now();

        loop {
            while in_flight.len() < self.max_concurrent_pages {
                let Some(url) = frontier.pop() else {
                    break;
                };

                if let Some(limit) = self.max_pages {
                    if context.visited_count() >= limit {
                        tracing::info!(
                            "Page limit of {} reached, dropping {} queued links",
                            limit,
                            frontier.len() + 1
                        );
                        frontier.clear();
                        break;
                    }
                }

                if !context.claim_page(&url) {
                    tracing::trace!("Already visited: {}", url);
                    continue;
                }

                tracing::debug!("Crawling: {}", url);
                in_flight.spawn(task.clone().explore_caught(url));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let explored = match joined {
                Ok(explored) => explored,
                // Panics are caught inside the task, so only cancellation lands here
                Err(e) => {
                    tracing::error!("Page task cancelled: {}", e);
                    continue;
                }
            };

            pages_fetched += 1;

            match explored.result {
                Ok(children) => frontier.extend(children.into_iter().rev()),
                Err(error) if explored.url == seed => {
                    return Err(HarvestError::SeedUnreachable {
                        url: seed.to_string(),
                        source: error,
                    });
                }
                Err(error) => {
                    tracing::warn!("Failed to fetch {}: {}", explored.url, error);
                    failed_pages.push(PageFailure {
                        url: explored.url,
                        error,
                    });
                }
            }

            if pages_fetched % 10 == 0 {
                let rate = pages_fetched as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {} documents, {:.2} pages/sec",
                    pages_fetched,
                    frontier.len(),
                    context.document_count(),
                    rate
                );
            }
        }

        let (visited, documents) = context.snapshot();

        tracing::info!(
            "Crawl completed: {} pages visited ({} failed), {} documents found in {:?}",
            visited.len(),
            failed_pages.len(),
            documents.len(),
            start_time.elapsed()
        );

        Ok(CrawlOutcome {
            seed,
            visited,
            documents,
            failed_pages,
        })
    }
}
