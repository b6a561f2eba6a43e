//! Axum route handlers for the AI API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::Category;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorizeResponse {
    pub category: Category,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiTask {
    Categorize,
    Sentiment,
}

#[derive(Debug, Deserialize)]
pub struct AiTaskRequest {
    pub text: String,
    pub task: AiTask,
}

/// POST /ai/categorize
///
/// Every failure maps to its own status: 503 while the model stays cold,
/// 502 for a non-JSON body, the upstream status for upstream errors, 500 otherwise.
pub async fn handle_categorize(
    State(state): State<AppState>,
    AppJson(req): AppJson<CategorizeRequest>,
) -> Result<Json<CategorizeResponse>, AppError> {
    let category = state.inference.categorize(&req.text).await?;
    Ok(Json(CategorizeResponse { category }))
}

/// POST /ai
/// Returns the raw model output for the requested task.
pub async fn handle_ai_task(
    State(state): State<AppState>,
    AppJson(req): AppJson<AiTaskRequest>,
) -> Result<Json<Value>, AppError> {
    let result = match req.task {
        AiTask::Categorize => state.inference.classify(&req.text).await,
        AiTask::Sentiment => state.inference.sentiment(&req.text).await,
    };
    result.map(Json).map_err(AppError::AiTask)
}
