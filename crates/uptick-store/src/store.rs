//! File-backed result store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use uptick_core::{CheckBatch, CheckResult};

use crate::error::{StoreError, StoreResult};

/// The persisted document: the latest batch and when it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub last_check: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl From<&CheckBatch> for Snapshot {
    fn from(batch: &CheckBatch) -> Self {
        Self {
            last_check: batch.timestamp,
            results: batch.results.clone(),
        }
    }
}

/// Holds the snapshot path; every save replaces the whole document.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `batch`, superseding the previous snapshot.
    pub fn save(&self, batch: &CheckBatch) -> StoreResult<()> {
        let snapshot = Snapshot::from(batch);
        let body = serde_json::to_vec_pretty(&snapshot).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;
        }

        let tmp = self.tmp_path();
        if let Err(source) = write_synced(&tmp, &body) {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(source));
        }
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_error(source));
        }

        debug!(
            path = %self.path.display(),
            results = snapshot.results.len(),
            "snapshot written"
        );
        Ok(())
    }

    /// Read the current snapshot; `None` if none has been written yet.
    pub fn load(&self) -> StoreResult<Option<Snapshot>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| {
                warn!(path = %self.path.display(), error = %source, "snapshot is not valid JSON");
                StoreError::Deserialize {
                    path: self.path.clone(),
                    source,
                }
            })
    }

    /// Sibling temp file, so the final rename stays on one filesystem.
    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

fn write_synced(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(body)?;
    file.sync_all()
}
