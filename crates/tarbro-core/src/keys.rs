//! Cache key construction.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt;

/// Key of one cached entry: the request path namespace plus the internal
/// archive path, joined by `?`.
///
/// `%` and `?` in the request path are percent-escaped, so the first `?`
/// in a key is always the separator and two different pairs can never
/// produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(request_path: &str, internal_path: &str) -> Self {
        Self(format!("{}{}", namespace(request_path), internal_path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Characters escaped in the request path part of a key.
const REQUEST_PATH: &AsciiSet = &CONTROLS.add(b'%').add(b'?');

/// Prefix shared by every key of a request path.
pub fn namespace(request_path: &str) -> String {
    format!("{}?", utf8_percent_encode(request_path, REQUEST_PATH))
}
