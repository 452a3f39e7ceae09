//! Request resolution: listings, file streams and not-found.

use crate::stream::{ChunkStream, chunked, chunked_with};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use tarbro_archive::{ArchiveReader, normalize_path};
use tarbro_cache::{CacheWarmer, LazyCache};
use tarbro_core::keys::namespace;
use tarbro_core::{CacheStore, Error, Kind, Listing, Result};
use tracing::{debug, error, warn};

/// Bytes read from the start of a file to choose between text and binary.
pub const PREFIX_LEN: usize = 40;

/// Chunk size for whole-archive downloads.
const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// How a file should be presented to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// A file ready to stream.
pub struct FileStream {
    pub filename: String,
    pub content_type: &'static str,
    pub disposition: Disposition,
    pub body: ChunkStream,
}

impl FileStream {
    /// `Content-Disposition` header value.
    pub fn content_disposition(&self) -> String {
        match self.disposition {
            Disposition::Inline => format!("filename={}", self.filename),
            Disposition::Attachment => format!("attachment; filename={}", self.filename),
        }
    }
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("disposition", &self.disposition)
            .finish_non_exhaustive()
    }
}

/// Result of resolving one request.
#[derive(Debug)]
pub enum Resolution {
    /// Listing of the directory at `path`. For a symlink this is the
    /// link's target, not the link itself.
    Listing { path: String, listing: Listing },
    File(FileStream),
    NotFound(String),
}

/// Entry point of the indexing engine.
#[derive(Clone)]
pub struct Resolver {
    cache: LazyCache,
    warmer: CacheWarmer,
    warm_on_miss: bool,
}

impl Resolver {
    pub fn new(store: Arc<dyn CacheStore>, reader: ArchiveReader, ttl: Duration) -> Self {
        Self {
            cache: LazyCache::new(store.clone(), reader.clone(), ttl),
            warmer: CacheWarmer::new(store, reader, ttl),
            warm_on_miss: true,
        }
    }

    /// Enable or disable background warming of cold request paths.
    pub fn with_warming(mut self, enabled: bool) -> Self {
        self.warm_on_miss = enabled;
        self
    }

    pub fn cache(&self) -> &LazyCache {
        &self.cache
    }

    pub fn reader(&self) -> &ArchiveReader {
        self.cache.reader()
    }

    /// Resolve `internal_path` for a request on `request_path`.
    pub async fn dispatch(&self, request_path: &str, internal_path: &str) -> Result<Resolution> {
        if self.warm_on_miss {
            self.trigger_warm(request_path).await;
        }

        let internal_path = normalize_path(internal_path);
        let entry = match self.cache.get(request_path, internal_path).await {
            Ok(entry) => entry,
            Err(e @ (Error::MemberNotFound(_) | Error::UnsupportedEntryType { .. })) => {
                debug!(%request_path, %internal_path, error = %e, "Not found");
                return Ok(Resolution::NotFound(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        match entry.kind {
            Kind::Directory => Ok(Resolution::Listing {
                path: internal_path.to_string(),
                listing: Listing::from_entry(&entry),
            }),
            Kind::Symlink => {
                // One hop only: the target is listed as a directory even if
                // it is itself a link or a file.
                let target = normalize_path(entry.link_target.as_deref().unwrap_or_default());
                debug!(%internal_path, %target, "Redirecting symlink");
                let directory = self.cache.get_as_directory(request_path, target).await?;
                Ok(Resolution::Listing {
                    path: target.to_string(),
                    listing: Listing::from_entry(&directory),
                })
            }
            Kind::File => self.open_file(internal_path).await.map(Resolution::File),
        }
    }

    /// Stream the archive file itself, unmodified.
    pub async fn download_archive(&self) -> Result<FileStream> {
        let reader = self.reader().clone();
        let filename = reader
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());

        let file = tokio::task::spawn_blocking(move || reader.open_raw())
            .await
            .map_err(|e| Error::Internal(format!("Archive task failed: {}", e)))??;

        Ok(FileStream {
            filename,
            content_type: "application/octet-stream",
            disposition: Disposition::Attachment,
            body: chunked_with(file, DOWNLOAD_CHUNK_SIZE),
        })
    }

    async fn trigger_warm(&self, request_path: &str) {
        match self
            .cache
            .store()
            .has_any_key_with_prefix(&namespace(request_path))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                debug!(%request_path, "Cold namespace, spawning cache warm");
                let _ = self.warmer.spawn(request_path);
            }
            Err(e) => {
                warn!(%request_path, error = %e, "Cache store unavailable, not warming");
            }
        }
    }

    async fn open_file(&self, internal_path: &str) -> Result<FileStream> {
        let reader = self.reader().clone();
        let path = internal_path.to_string();

        let opened = tokio::task::spawn_blocking(move || {
            let handle = reader.open()?;
            let mut stream = handle.extract(&path)?;
            let mut prefix = Vec::with_capacity(PREFIX_LEN);
            stream
                .by_ref()
                .take(PREFIX_LEN as u64)
                .read_to_end(&mut prefix)
                .map_err(|e| Error::Extract {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            Ok::<_, Error>((prefix, stream))
        })
        .await
        .map_err(|e| Error::Internal(format!("Archive task failed: {}", e)))?;

        let (prefix, stream) = match opened {
            Ok(opened) => opened,
            Err(e @ Error::Extract { .. }) => {
                error!(%internal_path, error = %e, "Extract failed on a member classified as a file");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let (content_type, disposition) = if looks_like_text(&prefix) {
            ("text/plain", Disposition::Inline)
        } else {
            ("application/octet-stream", Disposition::Attachment)
        };

        let filename = internal_path
            .rsplit('/')
            .next()
            .unwrap_or(internal_path)
            .to_string();

        Ok(FileStream {
            filename,
            content_type,
            disposition,
            body: chunked(Cursor::new(prefix).chain(stream)),
        })
    }
}

/// Whether the prefix decodes as UTF-8. A multi-byte sequence cut off by
/// the end of the prefix fails to decode.
fn looks_like_text(prefix: &[u8]) -> bool {
    std::str::from_utf8(prefix).is_ok()
}
