//! Integration test infrastructure for tarbro.
//!
//! Fixture archives are built in temp directories and served through the
//! real resolver and router; no external services are needed.
//!
//! # Usage
//!
//! ```ignore
//! use tarbro_tests::{ArchiveFixture, start_test_server, ApiTestClient};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let dir = tempfile::TempDir::new().unwrap();
//!     let archive = ArchiveFixture::docs().write(dir.path(), "docs.tar");
//!     // Build a Resolver over `archive`, serve it, query it.
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tarbro_tests=debug")),
        )
        .with_test_writer()
        .try_init();
}
