//! In-process cache store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tarbro_core::{CacheStore, Error, Result};
use tokio::sync::RwLock;
use tokio::time::Instant;

struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cache store backed by a map in this process.
///
/// Entries expire on the tokio clock, so tests can move time with
/// `tokio::time::advance`.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|v| v.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live entries as sorted (key, value) pairs.
    pub async fn snapshot(&self) -> Vec<(String, String)> {
        let now = Instant::now();
        let mut pairs: Vec<(String, String)> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|(_, v)| v.is_live(now))
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, v| v.is_live(now));
        before - entries.len()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|v| v.is_live(now))
            .map(|v| v.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| Error::CacheStore("Invalid TTL: out of range".to_string()))?;
        let stored = StoredValue {
            value: value.to_string(),
            expires_at,
        };
        self.entries.write().await.insert(key.to_string(), stored);
        Ok(())
    }

    async fn has_any_key_with_prefix(&self, prefix: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .any(|(k, v)| k.starts_with(prefix) && v.is_live(now)))
    }
}
