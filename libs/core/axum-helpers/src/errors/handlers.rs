use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, error_response};

/// Fallback for routes that do not exist.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        "The requested resource was not found".to_string(),
        ErrorCode::NotFound,
    )
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        ErrorCode::MethodNotAllowed.default_message().to_string(),
        ErrorCode::MethodNotAllowed,
    )
}
