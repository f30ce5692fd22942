//! Detail-page enrichment
//!
//! Visits the detail page of a bounded number of canonical records, in
//! aggregation order, and merges what it finds into each record in place.
//! A failed fetch leaves that record un-enriched and moves on.

use crate::crawler::{Extractor, Fetcher, Pacer, Shutdown};
use crate::record::{CanonicalRecord, DetailFields};
use crate::{ExtractionError, PersistenceError};
use url::Url;

/// Progress of one enrichment pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    /// Records selected for enrichment
    pub selected: usize,
    /// Positions of the records visited so far, in visiting order
    pub processed: Vec<usize>,
    pub enriched: usize,
    pub failed: usize,
    /// True if shutdown stopped the pass early
    pub interrupted: bool,
}

impl EnrichOutcome {
    /// Copies of the visited records, in visiting order
    pub fn processed_records(&self, records: &[CanonicalRecord]) -> Vec<CanonicalRecord> {
        self.processed
            .iter()
            .filter_map(|&position| records.get(position).cloned())
            .collect()
    }
}

/// Runs the detail pass over canonical records
pub struct Enricher<'a> {
    fetcher: &'a Fetcher,
    extractor: &'a dyn Extractor,
    pacer: &'a Pacer,
    shutdown: &'a Shutdown,
    batch_size: usize,
}

impl<'a> Enricher<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        extractor: &'a dyn Extractor,
        pacer: &'a Pacer,
        shutdown: &'a Shutdown,
        batch_size: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            pacer,
            shutdown,
            batch_size: batch_size.max(1),
        }
    }

    /// Enriches the first `limit` records that are not yet enriched
    ///
    /// After every `batch_size` visited records, `on_batch` receives copies
    /// of all records visited so far. An error from `on_batch` aborts the
    /// pass; per-record fetch failures never do.
    pub async fn enrich<F>(
        &self,
        records: &mut [CanonicalRecord],
        limit: usize,
        mut on_batch: F,
    ) -> Result<EnrichOutcome, PersistenceError>
    where
        F: FnMut(&[CanonicalRecord]) -> Result<(), PersistenceError>,
    {
        let selected: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.enriched)
            .map(|(position, _)| position)
            .take(limit)
            .collect();

        let total = selected.len();
        let mut outcome = EnrichOutcome {
            selected: total,
            ..Default::default()
        };

        tracing::info!("Enriching {} of {} agents", total, records.len());

        for (i, &position) in selected.iter().enumerate() {
            if self.shutdown.is_triggered() || (i > 0 && !self.pacer.pause(self.shutdown).await) {
                outcome.interrupted = true;
                break;
            }

            let record = &mut records[position];
            let label = if record.title.is_empty() {
                record.name.clone()
            } else {
                record.title.clone()
            };
            tracing::info!("Enriching {}/{}: {}", i + 1, total, label);

            match self.fetch_detail(&record.url).await {
                Ok(detail) => {
                    record.apply_detail(detail);
                    record.enriched = true;
                    outcome.enriched += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping enrichment of {}: {}", record.url, e);
                    outcome.failed += 1;
                }
            }
            outcome.processed.push(position);

            if outcome.processed.len() % self.batch_size == 0 {
                on_batch(&outcome.processed_records(records))?;
            }
        }

        tracing::info!(
            "Enrichment finished: {} enriched, {} failed, {} not visited",
            outcome.enriched,
            outcome.failed,
            total - outcome.processed.len()
        );

        Ok(outcome)
    }

    async fn fetch_detail(&self, url: &str) -> Result<DetailFields, crate::ScrapeError> {
        let url = Url::parse(url).map_err(|_| ExtractionError::InvalidLink(url.to_string()))?;
        let document = self.fetcher.fetch(&url).await?;
        Ok(self.scan(&document.body, &document.url))
    }

    fn scan(&self, body: &str, url: &Url) -> DetailFields {
        let document = scraper::Html::parse_document(body);
        self.extractor.extract_detail(&document, url)
    }
}
