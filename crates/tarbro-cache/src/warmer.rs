//! Background cache warming.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tarbro_archive::{ArchiveReader, index_all};
use tarbro_core::{CacheKey, CacheStore, Error, Result};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Outcome of one warm run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// Entries committed to the store.
    pub written: usize,
    /// Members left out because they could not be classified.
    pub skipped: usize,
    /// Entries whose write failed.
    pub failed: usize,
    pub elapsed: Duration,
}

/// Precomputes and writes the cache entry of the root and every member of
/// the archive.
///
/// Every entry is written unconditionally, replacing whatever the store
/// holds. The warmer opens its own archive handle and talks to the request
/// path only through the store.
#[derive(Clone)]
pub struct CacheWarmer {
    store: Arc<dyn CacheStore>,
    reader: ArchiveReader,
    ttl: Duration,
}

impl CacheWarmer {
    pub fn new(store: Arc<dyn CacheStore>, reader: ArchiveReader, ttl: Duration) -> Self {
        Self { store, reader, ttl }
    }

    /// Run a warm for `request_path` as a detached task.
    pub fn spawn(&self, request_path: impl Into<String>) -> JoinHandle<()> {
        let warmer = self.clone();
        let request_path = request_path.into();
        tokio::spawn(async move {
            if let Err(e) = warmer.run_warm(&request_path).await {
                error!(%request_path, error = %e, "Cache warm aborted");
            }
        })
    }

    /// Warm every entry of `request_path`'s namespace.
    pub async fn run_warm(&self, request_path: &str) -> Result<WarmReport> {
        let started = Instant::now();
        info!(
            %request_path,
            archive = %self.reader.path().display(),
            "Starting cache warm"
        );

        let reader = self.reader.clone();
        let entries = tokio::task::spawn_blocking(move || {
            let handle = reader.open()?;
            Ok::<_, Error>(index_all(&handle))
        })
        .await
        .map_err(|e| Error::Internal(format!("Warm task failed: {}", e)))??;

        let mut report = WarmReport::default();
        for (path, entry) in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(%path, error = %e, "Not warming member");
                    report.skipped += 1;
                    continue;
                }
            };

            let key = CacheKey::new(request_path, &path);
            let written = match entry.to_json() {
                Ok(json) => self.store.set_with_ttl(key.as_str(), &json, self.ttl).await,
                Err(e) => Err(e),
            };
            match written {
                Ok(()) => report.written += 1,
                Err(e) => {
                    warn!(%key, error = %e, "Failed to warm cache entry");
                    report.failed += 1;
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            %request_path,
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Cache warm finished"
        );
        Ok(report)
    }
}
