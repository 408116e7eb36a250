use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use armory_core::{DomainError, ErrorKind};
use armory_infra::ServiceError;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidQuantity | ErrorKind::EmptyOrder => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::ItemNotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientStock | ErrorKind::ReservationConflict => StatusCode::CONFLICT,
        ErrorKind::NotAuthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::StorageFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let kind = err.kind();
    if kind == ErrorKind::StorageFailure {
        // Store details stay in the logs.
        tracing::error!(error = %err, "request failed on storage");
        return json_error(status_for(kind), kind.as_str(), "storage failure, please retry later");
    }
    json_error(status_for(kind), kind.as_str(), err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    service_error_to_response(err.into())
}

/// Extractor rejections (malformed body or query string) as `validation_error`.
pub fn rejection_to_response(message: String) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, ErrorKind::Validation.as_str(), message)
}

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
