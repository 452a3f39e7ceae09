//! Shared fixtures for this crate's tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tarbro_core::{CacheStore, Error, Result};
use tempfile::TempDir;

/// Writes the `docs` sample archive and returns its path.
pub fn docs_archive(dir: &TempDir) -> PathBuf {
    let mut builder = tar::Builder::new(Vec::new());
    let mut append = |path: &str, entry_type: tar::EntryType, data: &[u8], link: Option<&str>| {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_mtime(1_700_000_000);
        header.set_mode(0o644);
        header.set_size(data.len() as u64);
        match link {
            Some(target) => builder.append_link(&mut header, path, target).unwrap(),
            None => builder.append_data(&mut header, path, data).unwrap(),
        }
    };
    append("docs", tar::EntryType::Directory, &[], None);
    append("docs/readme.txt", tar::EntryType::Regular, &[b'r'; 120], None);
    append("docs/img", tar::EntryType::Directory, &[], None);
    append("docs/img/a.png", tar::EntryType::Regular, &[0x89, 0x50], None);
    append("latest", tar::EntryType::Symlink, &[], Some("docs/img"));

    let path = dir.path().join("docs.tar");
    std::fs::write(&path, builder.into_inner().unwrap()).unwrap();
    path
}

/// A store where every call fails.
pub struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::CacheStore("connection refused".into()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(Error::CacheStore("connection refused".into()))
    }

    async fn has_any_key_with_prefix(&self, _prefix: &str) -> Result<bool> {
        Err(Error::CacheStore("connection refused".into()))
    }
}

/// Wraps a store and counts writes.
pub struct CountingStore<S> {
    pub inner: S,
    pub sets: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            sets: AtomicUsize::new(0),
        }
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for CountingStore<S> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn has_any_key_with_prefix(&self, prefix: &str) -> Result<bool> {
        self.inner.has_any_key_with_prefix(prefix).await
    }
}
