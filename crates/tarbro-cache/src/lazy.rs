//! Get-or-compute access to cache entries.

use std::sync::Arc;
use std::time::Duration;
use tarbro_archive::{ArchiveHandle, ArchiveReader, build_directory_entry, build_entry, normalize_path};
use tarbro_core::{CacheEntry, CacheKey, CacheStore, Error, Result};
use tracing::{debug, warn};

/// Reads cache entries from the store, computing and storing them from the
/// archive on a miss.
///
/// Store failures never fail a request: a failed read is treated as a miss
/// and a failed write is logged.
#[derive(Clone)]
pub struct LazyCache {
    store: Arc<dyn CacheStore>,
    reader: ArchiveReader,
    ttl: Duration,
}

impl LazyCache {
    pub fn new(store: Arc<dyn CacheStore>, reader: ArchiveReader, ttl: Duration) -> Self {
        Self { store, reader, ttl }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn reader(&self) -> &ArchiveReader {
        &self.reader
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entry for `internal_path` within the namespace of `request_path`.
    ///
    /// Fails with `MemberNotFound` when a non-root path is not in the archive.
    pub async fn get(&self, request_path: &str, internal_path: &str) -> Result<CacheEntry> {
        let internal_path = normalize_path(internal_path);
        let key = CacheKey::new(request_path, internal_path);

        if let Some(entry) = self.lookup(&key).await {
            return Ok(entry);
        }

        let entry = self.compute(internal_path, build_entry).await?;
        self.write(&key, &entry).await;
        Ok(entry)
    }

    /// Entry for `internal_path` treated as a directory whatever it is.
    ///
    /// A cached directory entry is reused. Otherwise the directory view is
    /// computed but not stored, so the path's own key keeps its real kind.
    pub async fn get_as_directory(
        &self,
        request_path: &str,
        internal_path: &str,
    ) -> Result<CacheEntry> {
        let internal_path = normalize_path(internal_path);
        let key = CacheKey::new(request_path, internal_path);

        if let Some(entry) = self.lookup(&key).await
            && entry.kind.is_directory()
        {
            return Ok(entry);
        }

        self.compute(internal_path, build_directory_entry).await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.store.get(key.as_str()).await {
            Ok(Some(json)) => match CacheEntry::from_json(&json) {
                Ok(entry) => {
                    debug!(%key, "Cache hit");
                    Some(entry)
                }
                Err(e) => {
                    warn!(%key, error = %e, "Discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => {
                debug!(%key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "Cache store read failed, computing from archive");
                None
            }
        }
    }

    async fn write(&self, key: &CacheKey, entry: &CacheEntry) {
        let json = match entry.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(%key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set_with_ttl(key.as_str(), &json, self.ttl).await {
            warn!(%key, error = %e, "Cache store write failed");
        }
    }

    /// Open a private handle on the blocking pool and run `build` against it.
    async fn compute(
        &self,
        internal_path: &str,
        build: fn(&ArchiveHandle, &str) -> Result<CacheEntry>,
    ) -> Result<CacheEntry> {
        let reader = self.reader.clone();
        let path = internal_path.to_string();
        tokio::task::spawn_blocking(move || {
            let handle = reader.open()?;
            build(&handle, &path)
        })
        .await
        .map_err(|e| Error::Internal(format!("Archive task failed: {}", e)))?
    }
}
