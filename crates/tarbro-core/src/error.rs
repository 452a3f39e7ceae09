//! Error types for tarbro.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Archive errors
    #[error("Failed to open archive {path}: {reason}")]
    ArchiveOpen { path: String, reason: String },

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Cannot extract {path}: {reason}")]
    Extract { path: String, reason: String },

    #[error("Unsupported entry type {entry_type} for member {path}")]
    UnsupportedEntryType { path: String, entry_type: String },

    // Cache errors
    #[error("Cache store error: {0}")]
    CacheStore(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether the error means "nothing lives at this path".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::MemberNotFound(_))
    }
}
