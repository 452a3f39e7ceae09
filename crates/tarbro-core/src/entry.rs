//! Cached metadata for a single archive path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classification of an archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Directory,
    File,
    Symlink,
}

impl Kind {
    pub fn is_directory(self) -> bool {
        matches!(self, Kind::Directory)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Directory => "directory",
            Kind::File => "file",
            Kind::Symlink => "symlink",
        };
        f.write_str(s)
    }
}

/// Summary of one immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub kind: Kind,
    /// Last modification, formatted `YYYY-MM-DD HH:MM` (UTC).
    pub mtime: String,
    /// Human readable size, files only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Link target, symlinks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

/// The record stored in the cache for one (request path, internal path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub kind: Kind,
    /// Absent for the archive root, which has no member of its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
    /// Immediate children, present only for directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<BTreeMap<String, ChildSummary>>,
}

impl CacheEntry {
    /// Entry for the archive root.
    pub fn root(children: BTreeMap<String, ChildSummary>) -> Self {
        Self {
            kind: Kind::Directory,
            mtime: None,
            size: None,
            link_target: None,
            children: Some(children),
        }
    }

    pub fn directory(mtime: Option<String>, children: BTreeMap<String, ChildSummary>) -> Self {
        Self {
            kind: Kind::Directory,
            mtime,
            size: None,
            link_target: None,
            children: Some(children),
        }
    }

    /// Entry for a non-directory member, built from its own summary.
    pub fn leaf(summary: ChildSummary) -> Self {
        Self {
            kind: summary.kind,
            mtime: Some(summary.mtime),
            size: summary.size,
            link_target: summary.link_target,
            children: None,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
