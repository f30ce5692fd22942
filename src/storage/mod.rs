//! Storage module for persisting crawl data
//!
//! This module handles everything written to disk by a run:
//! - The dataset document shape (metadata, categories, agents)
//! - The final database snapshot
//! - Tag-qualified progress checkpoints

mod dataset;
mod json;
mod traits;

pub use dataset::{CrawlMetadata, Dataset, DatasetView, RunInfo, SCRAPER_VERSION};
pub use json::JsonStore;
pub use traits::{CheckpointTag, SnapshotStore, StorageResult};
