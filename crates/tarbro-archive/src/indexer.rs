//! Directory indexing and cache entry computation.

use crate::reader::{ArchiveHandle, Member, normalize_path};
use std::collections::{BTreeMap, HashMap};
use tarbro_core::format::{format_mtime, format_size};
use tarbro_core::{CacheEntry, ChildSummary, Error, Kind, Result};
use tracing::warn;

/// Name of `path` if it is an immediate child of `target`.
///
/// Matching is by whole segments: `ab/c` is not under `a`. The empty
/// target is the archive root.
pub fn immediate_child<'a>(path: &'a str, target: &str) -> Option<&'a str> {
    let rest = if target.is_empty() {
        path
    } else {
        path.strip_prefix(target)?.strip_prefix('/')?
    };
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

/// Summaries of the immediate children of `target`, keyed by name.
///
/// Children with an unsupported entry type are left out.
pub fn compute_children(
    handle: &ArchiveHandle,
    target: &str,
) -> Result<BTreeMap<String, ChildSummary>> {
    let target = normalize_path(target);
    let mut children = BTreeMap::new();

    for path in handle.list_members() {
        let Some(name) = immediate_child(path, target) else {
            continue;
        };
        let member = handle.get_member(path)?;
        match summarize(member) {
            Ok(summary) => {
                children.insert(name.to_string(), summary);
            }
            Err(Error::UnsupportedEntryType { path, entry_type }) => {
                warn!(%path, %entry_type, "Skipping unsupported archive member");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(children)
}

/// Display summary of one member.
pub fn summarize(member: &Member) -> Result<ChildSummary> {
    let kind = member.kind()?;
    Ok(ChildSummary {
        kind,
        mtime: format_mtime(member.mtime),
        size: (kind == Kind::File).then(|| format_size(member.size)),
        link_target: match kind {
            Kind::Symlink => member.link_target.clone(),
            _ => None,
        },
    })
}

/// The cache entry for `path`: the root and directories carry their
/// children, everything else its own summary.
pub fn build_entry(handle: &ArchiveHandle, path: &str) -> Result<CacheEntry> {
    let path = normalize_path(path);
    if path.is_empty() {
        return Ok(CacheEntry::root(compute_children(handle, "")?));
    }

    let summary = summarize(handle.get_member(path)?)?;
    if summary.kind.is_directory() {
        Ok(CacheEntry::directory(
            Some(summary.mtime),
            compute_children(handle, path)?,
        ))
    } else {
        Ok(CacheEntry::leaf(summary))
    }
}

/// A directory entry for `path` without classifying it first.
///
/// Missing paths and non-directories get whatever children the member list
/// places under them, usually none.
pub fn build_directory_entry(handle: &ArchiveHandle, path: &str) -> Result<CacheEntry> {
    let path = normalize_path(path);
    let mtime = handle.get_member(path).ok().map(|m| format_mtime(m.mtime));
    Ok(CacheEntry::directory(mtime, compute_children(handle, path)?))
}

/// Cache entries for the root and every member in one pass over the
/// member list, in archive order after the root.
///
/// Each entry equals what [`build_entry`] returns for the same path.
/// Members that fail to classify keep their error.
pub fn index_all(handle: &ArchiveHandle) -> Vec<(String, Result<CacheEntry>)> {
    let mut children: HashMap<&str, BTreeMap<String, ChildSummary>> = HashMap::new();
    for path in handle.list_members() {
        let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
        let Ok(member) = handle.get_member(path) else {
            continue;
        };
        match summarize(member) {
            Ok(summary) => {
                children
                    .entry(parent)
                    .or_default()
                    .insert(name.to_string(), summary);
            }
            Err(e) => warn!(%path, error = %e, "Skipping unsupported archive member"),
        }
    }

    let mut entries = Vec::with_capacity(handle.member_count() + 1);
    entries.push((
        String::new(),
        Ok(CacheEntry::root(children.remove("").unwrap_or_default())),
    ));

    for path in handle.list_members() {
        let entry = handle
            .get_member(path)
            .and_then(summarize)
            .map(|summary| {
                if summary.kind.is_directory() {
                    let own = children.get(path).cloned().unwrap_or_default();
                    CacheEntry::directory(Some(summary.mtime), own)
                } else {
                    CacheEntry::leaf(summary)
                }
            });
        entries.push((path.to_string(), entry));
    }

    entries
}
