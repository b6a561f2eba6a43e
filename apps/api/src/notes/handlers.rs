//! Axum route handlers for the Notes API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::{Note, NoteInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// GET /notes?q=<text>
pub async fn handle_list_notes(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state.notes.search(params.q.as_deref()).await?;
    Ok(Json(notes))
}

/// POST /notes
pub async fn handle_create_note(
    State(state): State<AppState>,
    AppJson(req): AppJson<NoteInput>,
) -> Result<Json<Note>, AppError> {
    let note = state.notes.create(&req).await?;
    Ok(Json(note))
}

/// PUT /notes/:id
pub async fn handle_update_note(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<NoteInput>,
) -> Result<Json<Note>, AppError> {
    let note = state
        .notes
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Note {id} not found")))?;
    Ok(Json(note))
}

/// DELETE /notes/:id
///
/// Succeeds whether or not the note existed.
pub async fn handle_delete_note(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.notes.delete(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::tests::{send, test_app};

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let app = test_app();
        for title in ["Standup notes", "Birthday gift ideas"] {
            let (status, created) = send(
                &app,
                "POST",
                "/notes",
                Some(json!({ "title": title, "content": "details", "category": "Work" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert!(created["id"].is_string());
            assert!(created["createdAt"].is_string());
        }

        let (status, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Birthday gift ideas", "Standup notes"]);
    }

    #[tokio::test]
    async fn test_search_query_filters() {
        let app = test_app();
        send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "Trip", "content": "Book the HOTEL", "category": "Personal" })),
        )
        .await;
        send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "Sprint", "content": "Ship search", "category": "Work" })),
        )
        .await;

        let (_, found) = send(&app, "GET", "/notes?q=hotel", None).await;
        assert_eq!(found.as_array().unwrap().len(), 1);
        assert_eq!(found[0]["title"], "Trip");

        let (_, none) = send(&app, "GET", "/notes?q=nowhere", None).await;
        assert_eq!(none, json!([]));
    }

    #[tokio::test]
    async fn test_create_with_blank_title_is_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "", "content": "body", "category": "Work" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_create_without_title_field_uses_error_envelope() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "content": "body", "category": "Work" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("title"));

        let (status, body) = send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "t", "content": "c", "category": "Chores" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_existing_and_missing() {
        let app = test_app();
        let (_, created) = send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "Draft", "content": "v1", "category": "Work" })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/notes/{id}"),
            Some(json!({ "title": "Final", "content": "v2", "category": "Ideas" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Final");
        assert_eq!(updated["category"], "Ideas");

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/notes/{}", uuid::Uuid::new_v4()),
            Some(json!({ "title": "Ghost", "content": "none", "category": "Work" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_always_succeeds() {
        let app = test_app();
        let (_, created) = send(
            &app,
            "POST",
            "/notes",
            Some(json!({ "title": "Temp", "content": "scratch" })),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, body) = send(&app, "DELETE", &format!("/notes/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, body) = send(&app, "DELETE", &format!("/notes/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (_, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(listed, json!([]));
    }
}
