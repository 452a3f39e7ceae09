//! Application state shared across handlers.

use crate::resolver::Resolver;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }
}
