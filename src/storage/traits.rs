//! Storage traits and checkpoint naming
//!
//! This module defines the trait interface for snapshot backends.

use crate::storage::{Dataset, DatasetView};
use crate::PersistenceError;
use std::fmt;
use std::path::PathBuf;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, PersistenceError>;

/// Qualifier distinguishing checkpoint files from each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointTag {
    /// Periodic checkpoint after this many enricher iterations
    Progress(usize),
    /// Written when the run is interrupted
    Interrupted,
    /// Written when the run fails
    Error,
}

impl fmt::Display for CheckpointTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress(processed) => write!(f, "{}", processed),
            Self::Interrupted => write!(f, "interrupted"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Trait for snapshot backends
///
/// A snapshot is the whole dataset; a checkpoint is a snapshot of a prefix
/// of it, written under a tag-qualified name so it never clobbers the final
/// database.
pub trait SnapshotStore {
    /// Writes the final database, returning its path
    fn write_snapshot(&self, dataset: &DatasetView<'_>) -> StorageResult<PathBuf>;

    /// Writes a progress checkpoint, returning its path
    fn write_checkpoint(&self, dataset: &DatasetView<'_>, tag: CheckpointTag) -> StorageResult<PathBuf>;

    /// Loads the final database written by a previous run
    fn load_snapshot(&self) -> StorageResult<Dataset>;
}
