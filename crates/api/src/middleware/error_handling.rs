//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON bodies:
//!
//! | Error | Status | Body |
//! |---|---|---|
//! | `Validation` | 422 | `{"errors": [...]}` |
//! | `NotFound` | 404 | `{"error": "..."}` |
//! | `BadRequest` | 400 | `{"error": "..."}` |
//! | `Database`, `Internal` | 500 | `{"error": "Internal server error"}` |
//!
//! Server-side failures are logged and never echoed to the caller.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use careflow_core::errors::ClinicError;
use serde_json::json;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on anything that yields a
/// `ClinicError`, an `eyre::Report` or a JSON body rejection.
#[derive(Debug)]
pub struct AppError(pub ClinicError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            ClinicError::Validation(messages) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": messages })),
            )
                .into_response(),
            ClinicError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ClinicError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ClinicError::Database(report) => {
                error!("Database error: {:?}", report);
                internal_error()
            }
            ClinicError::Internal(err) => {
                error!("Internal error: {}", err);
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

impl From<ClinicError> for AppError {
    fn from(err: ClinicError) -> Self {
        AppError(err)
    }
}

/// Reports from infrastructure code are treated as database failures.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(ClinicError::Database(err))
    }
}

/// Malformed JSON, a wrong content type or a mistyped field is the caller's
/// fault.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ClinicError::BadRequest(rejection.body_text()))
    }
}

/// Maps a ClinicError to an HTTP response
pub fn map_error(err: ClinicError) -> Response {
    AppError(err).into_response()
}
