use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use scoreboard_queue::QueueError;
use serde_json::json;
use thiserror::Error;

const DUPLICATE_MESSAGE: &str = "User has already submitted a score";
const SHUTTING_DOWN_MESSAGE: &str = "Server is shutting down";
const SERVER_ERROR_MESSAGE: &str = "Server error processing request";

/// Top-level API error shared by all route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("task queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Queue(QueueError::DuplicateUser(_)) => StatusCode::BAD_REQUEST,
            ApiError::Queue(QueueError::ShuttingDown) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // Internal detail (paths, io errors) stays in the log.
        let message = match &self {
            ApiError::Queue(QueueError::DuplicateUser(_)) => DUPLICATE_MESSAGE.to_string(),
            ApiError::Queue(QueueError::ShuttingDown) => SHUTTING_DOWN_MESSAGE.to_string(),
            ApiError::Queue(e) => {
                tracing::error!(error = %e, "request failed");
                SERVER_ERROR_MESSAGE.to_string()
            }
            ApiError::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
