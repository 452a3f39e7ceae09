//! Resolver and HTTP server for tarbro.

pub mod handlers;
pub mod middleware;
pub mod render;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod stream;

pub use resolver::{Disposition, FileStream, Resolution, Resolver};
pub use routes::create_router;
pub use state::AppState;

use axum::Router;
use std::sync::Arc;

/// Router with middleware applied, ready to serve.
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router(state)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(middleware::trace_layer())
}
