//! Member classification.

use crate::reader::Member;
use tarbro_core::{Error, Kind, Result};

/// Classify a member as a directory, regular file or symlink.
///
/// Every other entry type is rejected rather than mapped to a default.
pub fn classify(member: &Member) -> Result<Kind> {
    match member.entry_type {
        tar::EntryType::Directory => Ok(Kind::Directory),
        tar::EntryType::Regular | tar::EntryType::Continuous => Ok(Kind::File),
        tar::EntryType::Symlink => Ok(Kind::Symlink),
        other => Err(Error::UnsupportedEntryType {
            path: member.path.clone(),
            entry_type: format!("{:?}", other),
        }),
    }
}
