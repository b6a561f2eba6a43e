use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::inference::InferenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("AI processing failed: {0}")]
    AiTask(InferenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Inference(e) => inference_parts(e),
            AppError::AiTask(e) => {
                tracing::error!("AI task failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_ERROR",
                    "AI processing failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

fn inference_parts(err: &InferenceError) -> (StatusCode, &'static str, String) {
    match err {
        InferenceError::ModelLoading { .. } => {
            tracing::warn!("{err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_LOADING",
                "Model is still loading after several retries.".to_string(),
            )
        }
        InferenceError::MalformedResponse { .. } => (
            StatusCode::BAD_GATEWAY,
            "BAD_GATEWAY",
            "Invalid response from Hugging Face API.".to_string(),
        ),
        InferenceError::Upstream { status, message } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            "UPSTREAM_ERROR",
            message.clone(),
        ),
        InferenceError::NoLabels | InferenceError::UnexpectedLabel(_) => {
            tracing::error!("Categorization returned no usable label: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "NO_CATEGORY",
                "No category returned.".to_string(),
            )
        }
        InferenceError::Http(e) => {
            tracing::error!("Categorization failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INFERENCE_ERROR",
                "Failed to categorize note".to_string(),
            )
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
