use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Note, NoteInput};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Calls the editor and page make against the notes server.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Lists notes matching `query`; an empty query lists everything.
    async fn list(&self, query: &str) -> Result<Vec<Note>, ClientError>;

    async fn create(&self, input: &NoteInput) -> Result<Note, ClientError>;

    async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Note, ClientError>;

    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;

    async fn categorize(&self, text: &str) -> Result<Category, ClientError>;
}

#[derive(Deserialize)]
struct CategorizeBody {
    category: Category,
}

/// `NotesApi` over HTTP against the routes in `routes::build_router`.
#[derive(Clone)]
pub struct HttpNotesApi {
    client: Client,
    base_url: String,
}

impl HttpNotesApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns a non-2xx response into `ClientError::Status`.
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self, query: &str) -> Result<Vec<Note>, ClientError> {
        let mut request = self.client.get(self.url("/notes"));
        if !query.is_empty() {
            request = request.query(&[("q", query)]);
        }
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, input: &NoteInput) -> Result<Note, ClientError> {
        let response = self.client.post(self.url("/notes")).json(input).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Note, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/notes/{id}")))
            .json(input)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/notes/{id}")))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn categorize(&self, text: &str) -> Result<Category, ClientError> {
        let response = self
            .client
            .post(self.url("/ai/categorize"))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        let body: CategorizeBody = ensure_success(response).await?.json().await?;
        Ok(body.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_note(title: &str) -> Note {
        let now = Utc::now();
        Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "body".to_string(),
            category: Some(Category::Work),
            sentiment: None,
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_list_sends_query_param() {
        let server = MockServer::start().await;
        let note = sample_note("Standup");
        Mock::given(method("GET"))
            .and(path("/notes"))
            .and(query_param("q", "stand up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![note.clone()]))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpNotesApi::new(format!("{}/", server.uri())).unwrap();
        let notes = api.list("stand up").await.unwrap();
        assert_eq!(notes, vec![note]);
    }

    #[tokio::test]
    async fn test_categorize_reads_label() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/categorize"))
            .and(body_json(json!({ "text": "plan the offsite agenda" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "category": "Work" })))
            .mount(&server)
            .await;

        let api = HttpNotesApi::new(server.uri()).unwrap();
        assert_eq!(
            api.categorize("plan the offsite agenda").await.unwrap(),
            Category::Work
        );
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ai/categorize"))
            .respond_with(ResponseTemplate::new(503).set_body_string("still loading"))
            .mount(&server)
            .await;

        let api = HttpNotesApi::new(server.uri()).unwrap();
        let err = api.categorize("anything").await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }
}
