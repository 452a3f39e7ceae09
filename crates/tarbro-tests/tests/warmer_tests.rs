//! Cache warming against the shared store.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tarbro_api::Resolver;
use tarbro_archive::ArchiveReader;
use tarbro_cache::{CacheWarmer, FilesystemStore, LazyCache, MemoryStore};
use tarbro_core::CacheStore;
use tarbro_core::keys::namespace;
use tarbro_tests::{ArchiveFixture, CountingStore, FailingStore, wait_for};
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn test_cold_request_warms_namespace() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let store = Arc::new(MemoryStore::new());
    let resolver = Resolver::new(store.clone(), ArchiveReader::new(&archive), TTL);

    resolver.dispatch("/docs.tar", "docs").await.unwrap();

    // Root plus four members.
    let warmed = wait_for(Duration::from_secs(5), Duration::from_millis(10), || {
        let store = store.clone();
        async move { store.len().await == 5 }
    })
    .await;
    assert!(warmed);
}

#[tokio::test]
async fn test_warm_namespace_is_not_rewarmed() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let store = Arc::new(CountingStore::new(MemoryStore::new()));
    CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar")
        .await
        .unwrap();
    assert_eq!(store.set_count(), 5);

    let resolver = Resolver::new(store.clone(), ArchiveReader::new(&archive), TTL);
    resolver.dispatch("/docs.tar", "docs").await.unwrap();
    resolver.dispatch("/docs.tar", "docs/img").await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(store.set_count(), 5);
}

#[tokio::test]
async fn test_warm_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::linked().write(dir.path(), "linked.tar");
    let store = Arc::new(MemoryStore::new());
    let warmer = CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL);

    let first = warmer.run_warm("/linked.tar").await.unwrap();
    let snapshot = store.snapshot().await;
    let second = warmer.run_warm("/linked.tar").await.unwrap();

    assert_eq!(first.written, second.written);
    assert_eq!(store.snapshot().await, snapshot);
}

#[tokio::test]
async fn test_warmed_entries_match_lazy_entries() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs()
        .symlink("latest", "docs/img")
        .write(dir.path(), "docs.tar");

    let warmed = Arc::new(MemoryStore::new());
    CacheWarmer::new(warmed.clone(), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar")
        .await
        .unwrap();

    let lazy_store = Arc::new(MemoryStore::new());
    let lazy = LazyCache::new(lazy_store.clone(), ArchiveReader::new(&archive), TTL);
    for path in ["", "docs", "docs/readme.txt", "docs/img", "docs/img/a.png", "latest"] {
        lazy.get("/docs.tar", path).await.unwrap();
    }

    assert_eq!(warmed.snapshot().await, lazy_store.snapshot().await);
}

#[tokio::test]
async fn test_namespaces_do_not_overlap() {
    let dir = TempDir::new().unwrap();
    let fixture = ArchiveFixture::docs();
    let plain = fixture.write(dir.path(), "a.tar");
    let store = Arc::new(MemoryStore::new());

    CacheWarmer::new(store.clone(), ArchiveReader::new(&plain), TTL)
        .run_warm("/a.tar")
        .await
        .unwrap();

    assert!(store.has_any_key_with_prefix(&namespace("/a.tar")).await.unwrap());
    assert!(!store.has_any_key_with_prefix(&namespace("/a.tar.gz")).await.unwrap());
    assert!(!store.has_any_key_with_prefix(&namespace("/a")).await.unwrap());
}

#[tokio::test]
async fn test_same_archive_under_two_request_paths() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let store = Arc::new(MemoryStore::new());
    let warmer = CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL);

    warmer.run_warm("/one/docs.tar").await.unwrap();
    assert!(!store.has_any_key_with_prefix(&namespace("/two/docs.tar")).await.unwrap());
    warmer.run_warm("/two/docs.tar").await.unwrap();
    assert_eq!(store.len().await, 10);
}

#[tokio::test(start_paused = true)]
async fn test_warmed_entries_expire() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let store = Arc::new(MemoryStore::new());

    CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar")
        .await
        .unwrap();
    assert!(store.has_any_key_with_prefix("/docs.tar?").await.unwrap());

    tokio::time::advance(TTL + Duration::from_secs(1)).await;
    assert!(!store.has_any_key_with_prefix("/docs.tar?").await.unwrap());
    assert_eq!(store.get("/docs.tar?docs").await.unwrap(), None);
}

#[tokio::test]
async fn test_warm_into_filesystem_store() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write_gzip(dir.path(), "docs.tar.gz");
    let store = Arc::new(FilesystemStore::new(dir.path().join("cache")));

    let report = CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar.gz")
        .await
        .unwrap();
    assert_eq!(report.written, 5);

    // A second process sharing the directory sees the entries.
    let other = FilesystemStore::new(dir.path().join("cache"));
    assert!(other.has_any_key_with_prefix("/docs.tar.gz?").await.unwrap());
    assert!(other.get("/docs.tar.gz?docs/img").await.unwrap().is_some());
}

#[tokio::test]
async fn test_unsupported_members_are_skipped() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs()
        .fifo("docs/pipe")
        .write(dir.path(), "docs.tar");
    let store = Arc::new(MemoryStore::new());

    let report = CacheWarmer::new(store.clone(), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar")
        .await
        .unwrap();
    assert_eq!(report.written, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.get("/docs.tar?docs/pipe").await.unwrap(), None);
}

#[tokio::test]
async fn test_failing_store_reports_failures() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");

    let report = CacheWarmer::new(Arc::new(FailingStore), ArchiveReader::new(&archive), TTL)
        .run_warm("/docs.tar")
        .await
        .unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(report.failed, 5);
}
