pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::ai::handlers as ai;
use crate::notes::handlers as notes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Notes API
        .route(
            "/notes",
            get(notes::handle_list_notes).post(notes::handle_create_note),
        )
        .route(
            "/notes/:id",
            put(notes::handle_update_note).delete(notes::handle_delete_note),
        )
        // AI API
        .route("/ai", post(ai::handle_ai_task))
        .route("/ai/categorize", post(ai::handle_categorize))
        .with_state(state)
}
