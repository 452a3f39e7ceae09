//! Command handlers.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tarbro_api::{AppState, Resolver, build_app};
use tarbro_archive::ArchiveReader;
use tarbro_cache::{CacheWarmer, FilesystemStore, LazyCache, MemoryStore};
use tarbro_core::{CacheEntry, Kind, Listing};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;

/// Serve the configured archive until interrupted.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let archive = config
        .archive_path
        .clone()
        .context("No archive configured; pass --archive or set TARBRO_ARCHIVE_PATH")?;

    let resolver = Resolver::new(
        config.cache.build_store(),
        ArchiveReader::new(&archive),
        config.cache.ttl(),
    )
    .with_warming(config.cache.warm);
    let app = build_app(Arc::new(AppState::new(resolver)));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(
        addr = %listener.local_addr()?,
        archive = %archive.display(),
        backend = ?config.cache.backend,
        ttl_secs = config.cache.ttl_secs,
        "Serving archive"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Print the listing of `path` inside `archive`.
pub async fn ls(archive: &Path, path: &str) -> anyhow::Result<()> {
    let cache = LazyCache::new(
        Arc::new(MemoryStore::new()),
        ArchiveReader::new(archive),
        Duration::from_secs(60),
    );
    let entry = cache.get(&default_request_path(archive), path).await?;

    if entry.kind.is_directory() {
        for row in Listing::from_entry(&entry).rows {
            println!(
                "{}",
                format_row(
                    &row.name,
                    row.kind,
                    &row.mtime,
                    row.size.as_deref(),
                    row.link_target.as_deref()
                )
            );
        }
    } else {
        println!("{}", format_leaf(path, &entry));
    }
    Ok(())
}

/// Warm a filesystem cache for `archive` and report the outcome.
pub async fn warm(
    archive: &Path,
    request_path: Option<String>,
    cache_dir: &Path,
    ttl: u64,
) -> anyhow::Result<()> {
    let request_path = request_path.unwrap_or_else(|| default_request_path(archive));
    let warmer = CacheWarmer::new(
        Arc::new(FilesystemStore::new(cache_dir)),
        ArchiveReader::new(archive),
        Duration::from_secs(ttl),
    );

    let report = warmer.run_warm(&request_path).await?;
    println!(
        "Warmed {} entries for {} ({} skipped, {} failed) in {:.2?}",
        report.written, request_path, report.skipped, report.failed, report.elapsed
    );
    if report.failed > 0 {
        anyhow::bail!("{} cache writes failed", report.failed);
    }
    Ok(())
}

/// Remove expired entries from a filesystem cache.
pub async fn purge(cache_dir: &Path) -> anyhow::Result<()> {
    let removed = FilesystemStore::new(cache_dir).purge_expired().await?;
    println!("Removed {} expired entries from {}", removed, cache_dir.display());
    Ok(())
}

pub fn show_config(config: &ServerConfig) -> anyhow::Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}

/// `/name` of the archive file, the key namespace used outside the server.
fn default_request_path(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/{}", name)
}

fn format_leaf(path: &str, entry: &CacheEntry) -> String {
    format_row(
        path,
        entry.kind,
        entry.mtime.as_deref().unwrap_or_default(),
        entry.size.as_deref(),
        entry.link_target.as_deref(),
    )
}

fn format_row(
    name: &str,
    kind: Kind,
    mtime: &str,
    size: Option<&str>,
    link_target: Option<&str>,
) -> String {
    let name = match kind {
        Kind::Directory => format!("{}/", name),
        Kind::File => name.to_string(),
        Kind::Symlink => format!("{} -> {}", name, link_target.unwrap_or_default()),
    };
    format!("{:<16}  {:>12}  {}", mtime, size.unwrap_or("-"), name)
}
