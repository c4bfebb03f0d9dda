use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::enrichment::EnrichError;
use crate::llm_client::{CompletionFailure, FailureKind};
use crate::search_client::SearchFailure;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionFailure),

    #[error("Search error: {0}")]
    Search(#[from] SearchFailure),
}

impl From<EnrichError> for AppError {
    fn from(err: EnrichError) -> Self {
        match err {
            e @ (EnrichError::EmptySopText | EnrichError::TaskMismatch { .. }) => {
                AppError::Validation(e.to_string())
            }
            EnrichError::Completion(failure) => AppError::Completion(failure),
            EnrichError::Search(failure) => AppError::Search(failure),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Completion(failure) => {
                tracing::error!("Completion error: {failure}");
                match failure.kind {
                    FailureKind::RateLimit => (
                        StatusCode::TOO_MANY_REQUESTS,
                        "COMPLETION_RATE_LIMITED",
                        "The AI provider is rate limiting requests".to_string(),
                    ),
                    FailureKind::Auth => (
                        StatusCode::BAD_GATEWAY,
                        "COMPLETION_AUTH_ERROR",
                        "The AI provider rejected our credentials".to_string(),
                    ),
                    FailureKind::Upstream => (
                        StatusCode::BAD_GATEWAY,
                        "COMPLETION_UPSTREAM_ERROR",
                        "The AI provider returned an unusable response".to_string(),
                    ),
                    FailureKind::Unknown if failure.timed_out => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "COMPLETION_TIMEOUT",
                        "The AI provider did not respond in time".to_string(),
                    ),
                    FailureKind::Unknown => (
                        StatusCode::BAD_GATEWAY,
                        "COMPLETION_ERROR",
                        "An AI processing error occurred".to_string(),
                    ),
                }
            }
            AppError::Search(failure) => {
                tracing::error!("Search error: {failure}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SEARCH_ERROR",
                    "The search provider request failed".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
