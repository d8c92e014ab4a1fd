//! HTTP mapping for core errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::error::RagError;

/// HTTP status for an error
pub fn status_code(err: &RagError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_bad_request() {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Implement IntoResponse for automatic error conversion in Axum
impl IntoResponse for RagError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("{}", message);
        }

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
