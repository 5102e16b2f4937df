use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::RelayError;
use crate::types::ErrorBody;

/// JSON error reply: `{ "error": ..., "details"?: ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn internal() -> Self {
        Self::from(RelayError::Internal("handler panicked".into()))
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let status = StatusCode::from_u16(err.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: ErrorBody {
                error: err.public_message(),
                details: err.details().cloned(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection.body_text(), "Rejected chat request body");
        Self {
            status: rejection.status(),
            body: ErrorBody {
                error: rejection.body_text(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
