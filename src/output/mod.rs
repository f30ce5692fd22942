//! Output module for run summaries
//!
//! This module handles:
//! - Computing completeness statistics over a dataset
//! - Printing the human-readable summary after a run

pub mod stats;

pub use stats::{print_statistics, DatasetStatistics};
