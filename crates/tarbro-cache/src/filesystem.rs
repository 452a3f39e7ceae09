//! Filesystem-backed cache store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tarbro_core::{CacheStore, Error, Result};
use tracing::debug;

/// On-disk record for one key.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: String,
    expires_at: DateTime<Utc>,
    value: String,
}

impl Envelope {
    fn is_live(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Cache store keeping one JSON file per key under a root directory.
///
/// Several processes can share the directory. Writes go to a temp file that
/// is renamed over the target, so each set is atomic.
pub struct FilesystemStore {
    root_dir: PathBuf,
}

impl FilesystemStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root_dir.join(format!("{}.json", hex::encode(digest)))
    }

    async fn read_envelope(path: &Path) -> Result<Option<Envelope>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::CacheStore(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Remove expired entry files, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            if let Ok(Some(envelope)) = Self::read_envelope(&path).await
                && !envelope.is_live()
                && tokio::fs::remove_file(&path).await.is_ok()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>> {
        let mut read_dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(Error::CacheStore(format!(
                    "Failed to read cache dir: {}",
                    e
                )));
            }
        };

        let mut files = vec![];
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::CacheStore(format!("Failed to read entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl CacheStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(envelope) = Self::read_envelope(&self.key_path(key)).await? else {
            return Ok(None);
        };
        if envelope.key != key || !envelope.is_live() {
            return Ok(None);
        }
        Ok(Some(envelope.value))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir)
            .await
            .map_err(|e| Error::CacheStore(format!("Failed to create cache dir: {}", e)))?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::CacheStore(format!("Invalid TTL: {}", e)))?;
        let envelope = Envelope {
            key: key.to_string(),
            expires_at: Utc::now() + ttl,
            value: value.to_string(),
        };
        let bytes = serde_json::to_vec(&envelope)?;

        let target = self.key_path(key);
        let temp = self
            .root_dir
            .join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| Error::CacheStore(format!("Failed to write cache: {}", e)))?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Error::CacheStore(format!("Failed to commit cache: {}", e)));
        }

        debug!(%key, path = %target.display(), "Wrote cache entry");
        Ok(())
    }

    async fn has_any_key_with_prefix(&self, prefix: &str) -> Result<bool> {
        for path in self.entry_files().await? {
            // Files may vanish or be mid-rename under concurrent writers.
            if let Ok(Some(envelope)) = Self::read_envelope(&path).await
                && envelope.key.starts_with(prefix)
                && envelope.is_live()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for FilesystemStore {
    fn default() -> Self {
        Self::new(PathBuf::from("/var/tmp/tarbro-cache"))
    }
}
