//! HTTP tests against a live server.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;
use tarbro_api::Resolver;
use tarbro_archive::ArchiveReader;
use tarbro_cache::MemoryStore;
use tarbro_tests::{ApiTestClient, ArchiveFixture, PNG_BYTES, start_test_server};
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(60);

async fn serve(archive: &std::path::Path) -> ApiTestClient {
    let resolver = Resolver::new(
        Arc::new(MemoryStore::new()),
        ArchiveReader::new(archive),
        TTL,
    );
    let (addr, _handle) = start_test_server(resolver)
        .await
        .expect("Failed to start server");
    ApiTestClient::new(addr)
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let client = serve(&archive).await;

    assert!(client.health().await.expect("Health check failed"));
    let resp = client.get("/ready").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_directory_listing_page() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let client = serve(&archive).await;

    let resp = client.get("/docs.tar?docs").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(resp.headers().contains_key("x-request-id"));

    let body = resp.text().await.unwrap();
    let img = body.find("img/</a>").expect("img row missing");
    let readme = body.find("readme.txt</a>").expect("readme row missing");
    assert!(img < readme);
    assert!(body.contains("120 bytes"));
    assert!(body.contains(r#"<a href="/docs.tar">Parent Directory</a>"#));
}

#[tokio::test]
async fn test_root_listing_page() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let client = serve(&archive).await;

    let (status, body) = client.get_text("/docs.tar").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/docs.tar?docs">docs/</a>"#));
    assert!(body.contains(r#"<a href="/">Parent Directory</a>"#));
}

#[tokio::test]
async fn test_missing_member_is_404() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
    let client = serve(&archive).await;

    let (status, _) = client.get_text("/docs.tar?docs/missing.txt").await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_responses() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs()
        .file("docs/my notes.txt", "hello")
        .write(dir.path(), "docs.tar");
    let client = serve(&archive).await;

    let resp = client.get("/docs.tar?docs/readme.txt").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(resp.headers()[CONTENT_DISPOSITION], "filename=readme.txt");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &[b'r'; 120][..]);

    let resp = client.get("/docs.tar?docs/img/a.png").await.unwrap();
    assert_eq!(resp.headers()[CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        resp.headers()[CONTENT_DISPOSITION],
        "attachment; filename=a.png"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let (status, body) = client.get_text("/docs.tar?docs/my%20notes.txt").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "hello");
}

#[tokio::test]
async fn test_symlink_page_links_into_target() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::linked().write(dir.path(), "linked.tar");
    let client = serve(&archive).await;

    let (status, body) = client.get_text("/linked.tar?link").await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/linked.tar?b/c/one.txt">one.txt</a>"#));
}

#[tokio::test]
async fn test_download_streams_archive_unmodified() {
    let dir = TempDir::new().unwrap();
    let archive = ArchiveFixture::docs().write_gzip(dir.path(), "docs.tar.gz");
    let client = serve(&archive).await;

    let resp = client.get("/download").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[CONTENT_DISPOSITION],
        "attachment; filename=docs.tar.gz"
    );
    let body = resp.bytes().await.unwrap();
    assert_eq!(body.as_ref(), std::fs::read(&archive).unwrap().as_slice());
}

#[tokio::test]
async fn test_missing_archive_is_500() {
    let client = serve(std::path::Path::new("/nonexistent/docs.tar")).await;

    let (status, _) = client.get_text("/docs.tar?docs").await.unwrap();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let resp = client.get("/ready").await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
