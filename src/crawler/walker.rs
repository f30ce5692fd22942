//! Pagination walker
//!
//! Drives the fetcher and extractor across the listing pages of one
//! traversal root, `page=1` upward, until one of these stops it (checked in
//! order):
//!
//! 1. the page fetch failed
//! 2. the page yielded no items
//! 3. the page has no link to the next page
//! 4. the next page would exceed the page ceiling
//!
//! None of these is an error. Items from pages fetched before the stop are
//! always kept.

use crate::crawler::{Extractor, Fetcher, Pacer, Shutdown};
use crate::record::{Category, DiscoverySource, PartialRecord, TraversalRoot};
use crate::url::page_url;
use crate::FetchError;
use url::Url;

/// Why a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page could not be fetched
    FetchFailed(FetchError),
    /// A page contained no item links
    EmptyPage,
    /// A page had no link to the following page
    NoNextPage,
    /// The page ceiling was reached with more pages advertised
    CeilingReached,
    /// Shutdown was requested
    Interrupted,
}

/// Result of walking one traversal root
#[derive(Debug)]
pub struct WalkOutcome {
    pub root: TraversalRoot,
    /// Partial records in page order
    pub records: Vec<PartialRecord>,
    /// Pages that were fetched successfully
    pub pages_fetched: u32,
    pub stop: StopReason,
}

impl WalkOutcome {
    pub fn hit_ceiling(&self) -> bool {
        self.stop == StopReason::CeilingReached
    }

    pub fn interrupted(&self) -> bool {
        self.stop == StopReason::Interrupted
    }
}

/// What one listing page contributed
struct PageScan {
    items: Vec<PartialRecord>,
    has_next: bool,
}

/// Walks listing pages for a traversal root
pub struct PaginationWalker<'a> {
    fetcher: &'a Fetcher,
    extractor: &'a dyn Extractor,
    pacer: &'a Pacer,
    shutdown: &'a Shutdown,
    max_pages: u32,
}

impl<'a> PaginationWalker<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        extractor: &'a dyn Extractor,
        pacer: &'a Pacer,
        shutdown: &'a Shutdown,
        max_pages: u32,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            pacer,
            shutdown,
            max_pages: max_pages.max(1),
        }
    }

    /// Walks the listing pages of `root` starting at `listing`
    pub async fn walk(&self, root: TraversalRoot, listing: &Url) -> WalkOutcome {
        let mut records = Vec::new();
        let mut page = 1;
        let mut pages_fetched = 0;

        let stop = loop {
            if self.shutdown.is_triggered() {
                break StopReason::Interrupted;
            }

            let url = page_url(listing, page);
            let document = match self.fetcher.fetch(&url).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::warn!("{}; stopping {} after {} page(s)", e, root, pages_fetched);
                    break StopReason::FetchFailed(e);
                }
            };
            pages_fetched += 1;

            let source = DiscoverySource::new(root.clone(), page);
            let scan = self.scan(&document.body, &document.url, &source, page + 1);

            if scan.items.is_empty() {
                tracing::info!("No agents on page {} for {}", page, root);
                break StopReason::EmptyPage;
            }

            tracing::info!("Found {} agents on page {} for {}", scan.items.len(), page, root);
            records.extend(scan.items);

            if !scan.has_next {
                break StopReason::NoNextPage;
            }
            if page >= self.max_pages {
                tracing::warn!(
                    "Reached the {}-page limit for {}; later pages were not fetched",
                    self.max_pages,
                    root
                );
                break StopReason::CeilingReached;
            }

            if !self.pacer.pause(self.shutdown).await {
                break StopReason::Interrupted;
            }
            page += 1;
        };

        WalkOutcome {
            root,
            records,
            pages_fetched,
            stop,
        }
    }

    /// Walks the main listing at the origin root
    pub async fn scrape_main_pages(&self, root_url: &Url) -> WalkOutcome {
        self.walk(TraversalRoot::Main, root_url).await
    }

    /// Walks one category's listing
    pub async fn scrape_category_pages(&self, category: &Category) -> WalkOutcome {
        let root = TraversalRoot::Category(category.name.clone());
        match Url::parse(&category.url) {
            Ok(listing) => self.walk(root, &listing).await,
            Err(e) => {
                tracing::warn!("Skipping category {}: invalid URL {}: {}", category.name, category.url, e);
                WalkOutcome {
                    root,
                    records: Vec::new(),
                    pages_fetched: 0,
                    stop: StopReason::EmptyPage,
                }
            }
        }
    }

    // The parsed document is not Send, so it never lives across an await.
    fn scan(&self, body: &str, url: &Url, source: &DiscoverySource, next_page: u32) -> PageScan {
        let document = scraper::Html::parse_document(body);
        PageScan {
            items: self.extractor.extract_listing_items(&document, url, source),
            has_next: self.extractor.has_next_page(&document, url, next_page),
        }
    }
}
