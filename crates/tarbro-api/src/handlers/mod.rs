//! Request handlers.

pub mod browse;
pub mod download;
pub mod health;

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tarbro_core::Error;
use tracing::error;

use crate::resolver::FileStream;

/// Map an engine error to a status and message.
pub(crate) fn error_response(err: Error) -> (StatusCode, String) {
    let status = match &err {
        Error::MemberNotFound(_) | Error::UnsupportedEntryType { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (status, err.to_string())
}

/// Stream a file with its content type and disposition.
pub(crate) fn file_response(file: FileStream) -> Response {
    let disposition = file.content_disposition();
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(file.body),
    )
        .into_response()
}
