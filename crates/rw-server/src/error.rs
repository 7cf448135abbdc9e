//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rw_pages::PipelineError;
use serde_json::json;

/// Server error type.
///
/// Every variant maps to a generic 500 response; details go to the log.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The page pipeline failed.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The pipeline task panicked or was cancelled.
    #[error("Pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"error": "Internal server error"})),
        )
            .into_response()
    }
}
