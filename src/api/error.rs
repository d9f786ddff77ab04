use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::model::AddressError;
use crate::reconcile::PassError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Retryable: no membership facts could be established right now.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "error": msg, "retryable": true }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<AddressError> for ApiError {
    fn from(err: AddressError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<PassError> for ApiError {
    fn from(err: PassError) -> Self {
        match err {
            PassError::InvalidAddress(e) => e.into(),
            other => ApiError::ServiceUnavailable(other.to_string()),
        }
    }
}
