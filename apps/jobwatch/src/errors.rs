use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::record::MIN_DESCRIPTION_CHARS;
use crate::messenger::MessengerError;
use crate::scoring::ScoringError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job description too short for analysis ({chars} of {min} characters)", min = MIN_DESCRIPTION_CHARS)]
    InsufficientDescription { chars: usize },

    #[error("Messenger error: {0}")]
    Messenger(#[from] MessengerError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InsufficientDescription { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INSUFFICIENT_DESCRIPTION",
                self.to_string(),
            ),
            AppError::Messenger(e) => {
                tracing::warn!("Messenger error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CONTENT_SCRIPT_UNAVAILABLE",
                    e.to_string(),
                )
            }
            AppError::Scoring(e) => {
                tracing::error!("Scoring error: {e}");
                let message = match e {
                    ScoringError::Rejected(reason) => reason.clone(),
                    _ => "The scoring service could not analyze this job".to_string(),
                };
                (StatusCode::BAD_GATEWAY, "SCORING_ERROR", message)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
