//! File-based snapshot storage.
//!
//! One YAML document per snapshot. Saving writes a sibling temp file and
//! renames it over the target so a crash never leaves a truncated snapshot.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

use super::Snapshot;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Snapshot serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Snapshot deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Snapshot contains invalid data: {0}")]
    InvalidData(String),
}

/// Reads and writes a snapshot at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> Result<Snapshot, SnapshotError> {
        if !self.path.exists() {
            return Err(SnapshotError::NotFound(self.path.clone()));
        }

        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        serde_yaml::from_str(&yaml).map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))
    }

    /// Loads the snapshot, or an empty one when the file does not exist yet.
    pub async fn load_or_default(&self) -> Result<Snapshot, SnapshotError> {
        match self.load().await {
            Err(SnapshotError::NotFound(_)) => Ok(Snapshot::default()),
            other => other,
        }
    }

    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let yaml = serde_yaml::to_string(snapshot)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))?;

        let tmp = self.path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).await.map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }

    fn io_error(&self, e: std::io::Error) -> SnapshotError {
        SnapshotError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
