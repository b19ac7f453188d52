//! Error types for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qrpay::job::JobError;

/// Errors returned by route handlers, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `POST /start_job` without a non-empty `input`.
    #[error("Input is required")]
    MissingInput,

    /// Unknown, malformed or expired job id.
    #[error("{0}")]
    Job(#[from] JobError),

    /// The job ran and failed; carries its stored message.
    #[error("{0}")]
    JobFailed(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingInput => StatusCode::BAD_REQUEST,
            Self::Job(JobError::NotFound) => StatusCode::NOT_FOUND,
            Self::JobFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
