//! Cache layer for tarbro.
//!
//! Store adapters for the [`CacheStore`] port, the get-or-compute
//! [`LazyCache`] used on the request path, and the detached
//! [`CacheWarmer`] that fills a request path's namespace in the background.

pub mod filesystem;
pub mod lazy;
pub mod memory;
pub mod warmer;

#[cfg(test)]
pub(crate) mod testing;

pub use filesystem::FilesystemStore;
pub use lazy::LazyCache;
pub use memory::MemoryStore;
pub use tarbro_core::CacheStore;
pub use warmer::{CacheWarmer, WarmReport};
