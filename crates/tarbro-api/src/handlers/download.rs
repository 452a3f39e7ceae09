//! Whole-archive download.

use axum::{extract::State, http::StatusCode, response::Response};
use std::sync::Arc;

use super::{error_response, file_response};
use crate::state::AppState;

pub async fn download(State(state): State<Arc<AppState>>) -> Result<Response, (StatusCode, String)> {
    let file = state
        .resolver
        .download_archive()
        .await
        .map_err(error_response)?;
    Ok(file_response(file))
}
