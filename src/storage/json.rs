//! JSON snapshot backend
//!
//! Every write goes to a temporary file in the target directory which is
//! then renamed over the destination, so a crash mid-write leaves the
//! previous file intact.

use crate::config::OutputConfig;
use crate::storage::traits::{CheckpointTag, SnapshotStore, StorageResult};
use crate::storage::{Dataset, DatasetView};
use crate::PersistenceError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Snapshot store writing pretty-printed JSON under a data directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    database_name: String,
    checkpoint_prefix: String,
}

impl JsonStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        database_name: impl Into<String>,
        checkpoint_prefix: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            database_name: database_name.into(),
            checkpoint_prefix: checkpoint_prefix.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            &config.data_dir,
            &config.database_name,
            &config.checkpoint_prefix,
        )
    }

    /// Path of the final database
    pub fn database_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.database_name))
    }

    /// Path of the checkpoint with the given tag
    pub fn checkpoint_path(&self, tag: CheckpointTag) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", self.checkpoint_prefix, tag))
    }
}

impl SnapshotStore for JsonStore {
    fn write_snapshot(&self, dataset: &DatasetView<'_>) -> StorageResult<PathBuf> {
        let path = self.database_path();
        write_json_atomic(&path, dataset)?;
        tracing::info!(
            "Database saved to {} ({} agents, {} categories)",
            path.display(),
            dataset.metadata.total_agents,
            dataset.metadata.total_categories
        );
        Ok(path)
    }

    fn write_checkpoint(&self, dataset: &DatasetView<'_>, tag: CheckpointTag) -> StorageResult<PathBuf> {
        let path = self.checkpoint_path(tag);
        write_json_atomic(&path, dataset)?;
        tracing::info!(
            "Progress saved to {} ({} agents)",
            path.display(),
            dataset.metadata.total_agents
        );
        Ok(path)
    }

    fn load_snapshot(&self) -> StorageResult<Dataset> {
        let file = File::open(self.database_path())?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Serializes `value` to `path` with 2-space indentation and unescaped
/// Unicode, replacing any existing file atomically
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| PersistenceError::Persist {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
