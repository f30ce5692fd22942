use crate::record::{CanonicalRecord, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version string written into every snapshot
pub const SCRAPER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Facts about a run that do not change while it executes
#[derive(Debug, Clone)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,
    pub source_url: String,
}

impl RunInfo {
    pub fn start(source_url: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            source_url: source_url.into(),
        }
    }
}

/// Snapshot header; counts are computed when the snapshot is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlMetadata {
    pub scraped_at: String,
    pub total_agents: usize,
    pub total_categories: usize,
    pub source_url: String,
    pub scraper_version: String,
}

impl CrawlMetadata {
    fn compute(run: &RunInfo, categories: &[Category], records: &[CanonicalRecord]) -> Self {
        Self {
            scraped_at: run.started_at.to_rfc3339(),
            total_agents: records.len(),
            total_categories: categories.len(),
            source_url: run.source_url.clone(),
            scraper_version: SCRAPER_VERSION.to_string(),
        }
    }
}

/// Borrowed view of the dataset, serialized by the snapshot writer
#[derive(Debug, Serialize)]
pub struct DatasetView<'a> {
    pub metadata: CrawlMetadata,
    pub categories: &'a [Category],
    #[serde(rename = "agents")]
    pub records: &'a [CanonicalRecord],
}

impl<'a> DatasetView<'a> {
    pub fn new(run: &RunInfo, categories: &'a [Category], records: &'a [CanonicalRecord]) -> Self {
        Self {
            metadata: CrawlMetadata::compute(run, categories, records),
            categories,
            records,
        }
    }
}

/// A dataset loaded back from disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: CrawlMetadata,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(rename = "agents", default)]
    pub records: Vec<CanonicalRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DiscoverySource, PartialRecord, TraversalRoot};

    fn record(slug: &str) -> CanonicalRecord {
        CanonicalRecord::from_partial(PartialRecord::new(
            format!("https://example.com/agent/{}", slug),
            slug,
            DiscoverySource::new(TraversalRoot::Main, 1),
        ))
    }

    #[test]
    fn test_counts_computed_from_slices() {
        let run = RunInfo::start("https://example.com");
        let categories = vec![Category {
            name: "writing".to_string(),
            title: "Writing".to_string(),
            url: "https://example.com/categories/writing".to_string(),
            count: Some(12),
        }];
        let records = vec![record("a"), record("b"), record("c")];

        let view = DatasetView::new(&run, &categories, &records[..2]);
        assert_eq!(view.metadata.total_agents, 2);
        assert_eq!(view.metadata.total_categories, 1);
        assert_eq!(view.metadata.source_url, "https://example.com");
        assert_eq!(view.metadata.scraper_version, SCRAPER_VERSION);
    }

    #[test]
    fn test_top_level_shape() {
        let run = RunInfo::start("https://example.com");
        let records = vec![record("a")];
        let view = DatasetView::new(&run, &[], &records);

        let value = serde_json::to_value(&view).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("metadata"));
        assert!(object.contains_key("categories"));
        assert_eq!(object["agents"].as_array().unwrap().len(), 1);
        assert!(value["metadata"]["scraped_at"]
            .as_str()
            .unwrap()
            .parse::<DateTime<Utc>>()
            .is_ok());
    }
}
