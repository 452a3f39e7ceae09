//! HTTP middleware for the browse server.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

const REQUEST_ID: &str = "x-request-id";

/// Request/response tracing at info level.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Inject request ID into each request, keeping one the client sent.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());
    let Some(request_id) = request_id else {
        return next.run(request).await;
    };
    request
        .headers_mut()
        .insert(REQUEST_ID, request_id.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID, request_id);

    response
}
