use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::PROTOCOL_VERSION;

use crate::state::{AckResponse, ApiError, ErrorResponse};

pub fn json_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            version: PROTOCOL_VERSION,
            error: message.into(),
        }),
    )
}

/// The API reports every failure with the same status.
pub fn api_error(message: impl Into<String>) -> ApiError {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn json_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_error(status, message).into_response()
}

pub fn ack() -> Json<AckResponse> {
    Json(AckResponse {
        version: PROTOCOL_VERSION,
    })
}
