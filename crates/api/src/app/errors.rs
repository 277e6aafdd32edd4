use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use itemproc_core::DomainError;
use itemproc_infra::{BatchError, StoreError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Validation failures are returned as a bare JSON array of messages.
pub fn validation_error(messages: Vec<String>) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, axum::Json(messages)).into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(messages) => validation_error(messages),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "item store failure");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn batch_error_to_response(err: BatchError) -> axum::response::Response {
    match err {
        BatchError::Scan(e) => store_error_to_response(e),
        e @ BatchError::DeadlineExceeded { .. } => {
            json_error(StatusCode::GATEWAY_TIMEOUT, "batch_deadline_exceeded", e.to_string())
        }
        e @ BatchError::Incomplete { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "batch_incomplete", e.to_string())
        }
    }
}

/// Every unreadable body is a 400, including well-formed JSON of the wrong shape.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}
