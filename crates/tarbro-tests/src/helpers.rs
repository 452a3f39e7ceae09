//! Test helper functions and utilities.

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tarbro_api::{AppState, FileStream, Resolver, build_app};
use tarbro_core::{CacheStore, Error, Result};
use tokio::net::TcpListener;

/// Start a server for `resolver` on an ephemeral port and return its address.
pub async fn start_test_server(
    resolver: Resolver,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = build_app(Arc::new(AppState::new(resolver)));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Test server failed");
        }
    });

    Ok((addr, handle))
}

/// Create an HTTP client for testing.
pub fn test_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create test client")
}

/// HTTP test client with base URL.
pub struct ApiTestClient {
    client: Client,
    base_url: String,
}

impl ApiTestClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            client: test_client(),
            base_url: format!("http://{}", addr),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(self.url(path)).send().await
    }

    /// GET `path` and return status and body text.
    pub async fn get_text(&self, path: &str) -> anyhow::Result<(reqwest::StatusCode, String)> {
        let resp = self.get(path).await?;
        let status = resp.status();
        Ok((status, resp.text().await?))
    }

    /// Check health endpoint.
    pub async fn health(&self) -> anyhow::Result<bool> {
        let resp = self.get("/health").await?;
        Ok(resp.status().is_success())
    }
}

/// Drain a file stream into memory.
pub async fn collect_body(file: FileStream) -> std::io::Result<Vec<u8>> {
    file.body
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok::<_, std::io::Error>(acc)
        })
        .await
}

/// A cache store where every call fails.
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::CacheStore("store unreachable".to_string()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(Error::CacheStore("store unreachable".to_string()))
    }

    async fn has_any_key_with_prefix(&self, _prefix: &str) -> Result<bool> {
        Err(Error::CacheStore("store unreachable".to_string()))
    }
}

/// Wraps a store and counts writes.
pub struct CountingStore<S> {
    inner: S,
    sets: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            sets: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
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

/// Wait for a condition with timeout.
pub async fn wait_for<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, block_on};

    #[tokio::test]
    async fn test_wait_for_immediate() {
        let result = wait_for(Duration::from_secs(1), Duration::from_millis(10), || async {
            true
        })
        .await;
        assert!(result);
    }

    #[tokio::test]
    async fn test_wait_for_timeout() {
        let result = wait_for(Duration::from_millis(50), Duration::from_millis(10), || async {
            false
        })
        .await;
        assert!(!result);
    }

    #[test]
    fn test_failing_store_fails_every_call() {
        let store = FailingStore;
        assert_err!(block_on(store.get("k")));
        assert_err!(block_on(store.set_with_ttl("k", "v", Duration::from_secs(1))));
        assert_err!(block_on(store.has_any_key_with_prefix("k")));
    }
}
