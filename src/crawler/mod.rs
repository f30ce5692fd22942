//! Crawler module for fetching, extracting and orchestrating a crawl
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a single shared client
//! - Document extraction behind a swappable `Extractor` strategy
//! - Bounded pagination over each traversal root
//! - Detail-page enrichment with periodic checkpoints
//! - Politeness pacing and interrupt handling
//! - Overall crawl coordination

mod coordinator;
mod enricher;
mod extractor;
mod fetcher;
mod pacer;
mod shutdown;
mod walker;

pub use coordinator::{run_crawl, Coordinator, RunReport};
pub use enricher::{EnrichOutcome, Enricher};
pub use extractor::{Extractor, HeuristicExtractor};
pub use fetcher::{build_http_client, Document, Fetcher};
pub use pacer::Pacer;
pub use shutdown::Shutdown;
pub use walker::{PaginationWalker, StopReason, WalkOutcome};
