//! Route definitions.

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::handlers::{browse, download, health};
use crate::state::AppState;

/// Create the router. Every path not claimed by a fixed route is browsed.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/download", get(download::download))
        .fallback(browse::browse)
        .with_state(state)
}
