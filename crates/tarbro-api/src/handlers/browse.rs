//! Archive browsing.
//!
//! The URL path names the archive's namespace and the query string names
//! the member inside it: `/files/a.tar?docs/img`.

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use std::sync::Arc;

use super::{error_response, file_response};
use crate::render::render_listing;
use crate::resolver::Resolution;
use crate::state::AppState;

pub async fn browse(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, (StatusCode, String)> {
    if method != Method::GET && method != Method::HEAD {
        return Err((
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        ));
    }

    let request_path = decode(uri.path());
    let internal_path = decode(uri.query().unwrap_or_default());

    let resolution = state
        .resolver
        .dispatch(&request_path, &internal_path)
        .await
        .map_err(error_response)?;

    Ok(match resolution {
        Resolution::Listing { path, listing } => {
            Html(render_listing(&request_path, &path, &listing)).into_response()
        }
        Resolution::File(file) => file_response(file),
        Resolution::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
    })
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
