//! tarbro core
//!
//! Domain types, the cache store port and error handling shared by every
//! tarbro crate. This crate does no I/O of its own.

pub mod entry;
pub mod error;
pub mod format;
pub mod keys;
pub mod listing;
pub mod ports;

pub use entry::{CacheEntry, ChildSummary, Kind};
pub use error::{Error, Result};
pub use keys::CacheKey;
pub use listing::{Listing, ListingRow};
pub use ports::CacheStore;
