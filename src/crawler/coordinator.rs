//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs one crawl from start to finish:
//! - Discovering categories on the category index
//! - Walking the main listing, then each category in discovery order
//! - Merging every listing sighting into the aggregator
//! - Enriching a bounded number of records from their detail pages
//! - Writing progress checkpoints and the final snapshot
//!
//! Everything runs on one logical thread with at most one request in flight.
//! An interrupt writes an `interrupted` checkpoint of what has accumulated; any
//! other failure writes an `error` checkpoint before the error is returned.

use crate::config::Config;
use crate::crawler::{
    EnrichOutcome, Enricher, Extractor, Fetcher, HeuristicExtractor, Pacer, PaginationWalker,
    Shutdown, StopReason, WalkOutcome,
};
use crate::output::DatasetStatistics;
use crate::record::{Aggregator, CanonicalRecord, Category, TraversalRoot};
use crate::storage::{CheckpointTag, DatasetView, JsonStore, RunInfo, SnapshotStore};
use crate::{PersistenceError, ScrapeError};
use std::path::PathBuf;
use url::Url;

/// Summary of a completed crawl
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Where the final snapshot was written
    pub database_path: PathBuf,
    pub statistics: DatasetStatistics,
    /// Listing pages fetched across all traversal roots
    pub pages_fetched: u32,
    /// Traversal roots that stopped at the page ceiling
    pub ceiling_hits: Vec<String>,
    /// Traversal roots that stopped on a fetch failure
    pub failed_roots: Vec<String>,
    pub enrichment: EnrichOutcome,
}

/// Listing-phase counters accumulated across traversal roots
#[derive(Debug, Default)]
struct ListingProgress {
    pages_fetched: u32,
    ceiling_hits: Vec<String>,
    failed_roots: Vec<String>,
}

impl ListingProgress {
    fn record(&mut self, outcome: &WalkOutcome) {
        self.pages_fetched += outcome.pages_fetched;
        if outcome.hit_ceiling() {
            self.ceiling_hits.push(outcome.root.to_string());
        }
        if matches!(outcome.stop, StopReason::FetchFailed(_)) {
            self.failed_roots.push(outcome.root.to_string());
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    root: Url,
    fetcher: Fetcher,
    extractor: Box<dyn Extractor>,
    pacer: Pacer,
    store: JsonStore,
    shutdown: Shutdown,
    run: RunInfo,
    categories: Vec<Category>,
    aggregator: Aggregator,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawl configuration
    /// * `shutdown` - Shutdown flag checked between requests
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScrapeError)` - The root URL or HTTP client could not be set up
    pub fn new(config: Config, shutdown: Shutdown) -> Result<Self, ScrapeError> {
        let root = config.site.root()?;
        let fetcher = Fetcher::from_config(&config)?;
        let extractor = Box::new(HeuristicExtractor::new(&config.site)?);
        let pacer = Pacer::from_config(&config.crawler);
        let store = JsonStore::from_config(&config.output);
        let run = RunInfo::start(config.site.root_url.clone());

        Ok(Self {
            config,
            root,
            fetcher,
            extractor,
            pacer,
            store,
            shutdown,
            run,
            categories: Vec::new(),
            aggregator: Aggregator::new(),
        })
    }

    /// Replaces the extraction strategy
    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replaces the snapshot store
    pub fn with_store(mut self, store: JsonStore) -> Self {
        self.store = store;
        self
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Canonical records accumulated so far, in aggregation order
    pub fn records(&self) -> &[CanonicalRecord] {
        self.aggregator.records()
    }

    /// Runs the crawl
    ///
    /// On interruption an `interrupted` checkpoint has been written and
    /// `ScrapeError::Interrupted` is returned. On any other failure an `error`
    /// checkpoint of all records is attempted before the error is returned.
    pub async fn run(&mut self) -> Result<RunReport, ScrapeError> {
        tracing::info!("Starting crawl of {}", self.root);
        let start_time = std::time::Instant::now();

        match self.crawl().await {
            Ok(report) => {
                tracing::info!(
                    "Crawl completed: {} agents, {} categories in {:?}",
                    report.statistics.total_agents,
                    report.statistics.total_categories,
                    start_time.elapsed()
                );
                Ok(report)
            }
            Err(ScrapeError::Interrupted) => Err(ScrapeError::Interrupted),
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                self.checkpoint(self.aggregator.records(), CheckpointTag::Error);
                Err(e)
            }
        }
    }

    /// Reads the category index and returns the categories in discovery order
    ///
    /// An unreachable index is not fatal: the crawl continues with the main
    /// listing only.
    pub async fn discover_categories(&self) -> Vec<Category> {
        let index_url = match self.config.site.category_index_url() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("{}", e);
                return Vec::new();
            }
        };

        let document = match self.fetcher.fetch(&index_url).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("{}; continuing without categories", e);
                return Vec::new();
            }
        };

        let categories = {
            let html = document.parse();
            self.extractor.extract_categories(&html, &document.url)
        };
        tracing::info!("Found {} categories", categories.len());
        categories
    }

    async fn crawl(&mut self) -> Result<RunReport, ScrapeError> {
        if self.shutdown.is_triggered() {
            self.checkpoint(&[], CheckpointTag::Interrupted);
            return Err(ScrapeError::Interrupted);
        }

        self.categories = self.discover_categories().await;
        self.pause_or_interrupt().await?;

        let progress = self.scrape_listings().await?;
        tracing::info!(
            "Listing phase done: {} unique agents from {} pages",
            self.aggregator.len(),
            progress.pages_fetched
        );

        let enrichment = self.enrich().await?;
        if enrichment.interrupted {
            let done = enrichment.processed_records(self.aggregator.records());
            self.checkpoint(&done, CheckpointTag::Interrupted);
            return Err(ScrapeError::Interrupted);
        }

        let records = self.aggregator.records();
        let database_path = self
            .store
            .write_snapshot(&DatasetView::new(&self.run, &self.categories, records))?;

        Ok(RunReport {
            database_path,
            statistics: DatasetStatistics::from_dataset(&self.categories, records),
            pages_fetched: progress.pages_fetched,
            ceiling_hits: progress.ceiling_hits,
            failed_roots: progress.failed_roots,
            enrichment,
        })
    }

    /// Walks the main listing and then every category, merging as it goes
    async fn scrape_listings(&mut self) -> Result<ListingProgress, ScrapeError> {
        let mut progress = ListingProgress::default();
        let walker = PaginationWalker::new(
            &self.fetcher,
            self.extractor.as_ref(),
            &self.pacer,
            &self.shutdown,
            self.config.crawler.max_pages,
        );

        let outcome = walker.scrape_main_pages(&self.root).await;
        progress.record(&outcome);
        let interrupted = outcome.interrupted();
        let stats = self.aggregator.merge(outcome.records);
        tracing::debug!(
            "Merged {}: {} new, {} seen",
            TraversalRoot::Main,
            stats.created,
            stats.merged
        );

        let total = self.categories.len();
        for (i, category) in self.categories.iter().enumerate() {
            if interrupted || !self.pacer.pause(&self.shutdown).await {
                return self.interrupted_during_listing();
            }

            tracing::info!("Scraping category {}/{}: {}", i + 1, total, category.title);
            let outcome = walker.scrape_category_pages(category).await;
            progress.record(&outcome);
            let interrupted = outcome.interrupted();
            let stats = self.aggregator.merge(outcome.records);
            tracing::debug!(
                "Merged category {}: {} new, {} seen",
                category.name,
                stats.created,
                stats.merged
            );
            if interrupted {
                return self.interrupted_during_listing();
            }
        }

        if interrupted {
            return self.interrupted_during_listing();
        }

        Ok(progress)
    }

    fn interrupted_during_listing(&self) -> Result<ListingProgress, ScrapeError> {
        self.checkpoint(self.aggregator.records(), CheckpointTag::Interrupted);
        Err(ScrapeError::Interrupted)
    }

    async fn enrich(&mut self) -> Result<EnrichOutcome, PersistenceError> {
        let enricher = Enricher::new(
            &self.fetcher,
            self.extractor.as_ref(),
            &self.pacer,
            &self.shutdown,
            self.config.crawler.checkpoint_every,
        );

        let store = &self.store;
        let run = &self.run;
        let categories = &self.categories;

        enricher
            .enrich(
                self.aggregator.records_mut(),
                self.config.crawler.enrich_limit,
                |done| {
                    store
                        .write_checkpoint(
                            &DatasetView::new(run, categories, done),
                            CheckpointTag::Progress(done.len()),
                        )
                        .map(|_| ())
                },
            )
            .await
    }

    async fn pause_or_interrupt(&self) -> Result<(), ScrapeError> {
        if self.pacer.pause(&self.shutdown).await {
            Ok(())
        } else {
            self.checkpoint(self.aggregator.records(), CheckpointTag::Interrupted);
            Err(ScrapeError::Interrupted)
        }
    }

    /// Best-effort checkpoint; a failure here is logged, not returned
    fn checkpoint(&self, records: &[CanonicalRecord], tag: CheckpointTag) {
        let view = DatasetView::new(&self.run, &self.categories, records);
        if let Err(e) = self.store.write_checkpoint(&view, tag) {
            tracing::error!("Failed to write {} checkpoint: {}", tag, e);
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Arguments
///
/// * `config` - The validated crawl configuration
/// * `shutdown` - Shutdown flag; trigger it to stop at the next request boundary
pub async fn run_crawl(config: Config, shutdown: Shutdown) -> Result<RunReport, ScrapeError> {
    let mut coordinator = Coordinator::new(config, shutdown)?;
    coordinator.run().await
}
