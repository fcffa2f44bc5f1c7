//! JSON-file store: one file per profile, one entry per key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::traits::{SessionStore, decode_raw};
use crate::error::StorageError;

/// Persists entries to a JSON object on disk: `{ "<key>": "<encoded>" }`.
///
/// Every operation re-reads the file so edits made by another process are
/// picked up. Writes go through a temp file and a rename.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`, creating parent directories.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Write {
                        path: parent.display().to_string(),
                        reason: e.to_string(),
                    })?;
            }
        }
        info!(path = %path.display(), "Session store opened");
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Read {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| StorageError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };
        fs::write(&tmp, content).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await?;
        Ok(entries.get(key).map(|raw| decode_raw(raw)))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), serde_json::to_string(value)?);
        self.save(&entries).await?;
        debug!(key, "Stored session key");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
            debug!(key, "Removed session key");
        }
        Ok(())
    }
}
