//! Port traits (hexagonal architecture).
//!
//! The cache store is the only external collaborator of the indexing
//! engine. Adapters live in `tarbro-cache`.

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key/value store with per-key expiry, shared by the request path and the
/// cache warmer.
///
/// Each `set_with_ttl` must be atomic for its key: readers observe either
/// the previous value or the new one, never a partial write.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, `None` on miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any existing one, expiring after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Whether any live key starts with `prefix`.
    async fn has_any_key_with_prefix(&self, prefix: &str) -> Result<bool>;
}
