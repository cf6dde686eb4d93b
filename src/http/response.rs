//! Response construction: upstream relays and the JSON error envelope.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::forward::{ForwardError, UpstreamReply};

/// JSON envelope returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Relay a successful upstream reply verbatim, preserving its content type.
pub fn relay_response(reply: UpstreamReply) -> Response {
    let content_type = reply
        .content_type
        .unwrap_or_else(|| "application/json".to_owned());
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
}

// Every forwarding failure collapses into one "proxy failure" response.
impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}
