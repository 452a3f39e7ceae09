//! Ordered directory listings derived from cache entries.

use crate::entry::{CacheEntry, Kind};
use serde::Serialize;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub name: String,
    pub kind: Kind,
    pub mtime: String,
    pub size: Option<String>,
    pub link_target: Option<String>,
}

/// Immediate children of a directory, directories first, each group sorted
/// by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub rows: Vec<ListingRow>,
}

impl Listing {
    /// Build a listing from a directory entry. Non-directory entries yield
    /// an empty listing.
    pub fn from_entry(entry: &CacheEntry) -> Self {
        let mut rows: Vec<ListingRow> = entry
            .children
            .iter()
            .flatten()
            .map(|(name, child)| ListingRow {
                name: name.clone(),
                kind: child.kind,
                mtime: child.mtime.clone(),
                size: child.size.clone(),
                link_target: child.link_target.clone(),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.kind
                .is_directory()
                .cmp(&a.kind.is_directory())
                .then_with(|| a.name.cmp(&b.name))
        });

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }
}
