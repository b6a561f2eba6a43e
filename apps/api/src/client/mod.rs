// Client-side controller logic for the notes UI: the HTTP API wrapper,
// the editor form, and the list page with debounced search.
// Rendering is left to the embedding front end; these types own the state.

pub mod api;
pub mod debounce;
pub mod editor;
pub mod page;

pub use api::{ClientError, HttpNotesApi, NotesApi};
pub use debounce::Debouncer;
pub use editor::{EditorForm, NoteEditor, SubmitError};
pub use page::{NotesPage, NotesView, PageSettings};

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::api::{ClientError, NotesApi};
    use crate::models::{Category, Note, NoteInput};
    use crate::notes::{InMemoryNoteStore, NoteStore};

    /// `NotesApi` backed by the in-memory store, with a scripted categorizer.
    pub(crate) struct FakeApi {
        store: InMemoryNoteStore,
        category: Option<Category>,
        delay: Duration,
        categorize_calls: AtomicUsize,
        pub(crate) list_queries: Mutex<Vec<String>>,
    }

    impl Default for FakeApi {
        fn default() -> Self {
            Self::with_category(Category::Work)
        }
    }

    impl FakeApi {
        pub(crate) fn with_category(category: Category) -> Self {
            Self {
                store: InMemoryNoteStore::new(),
                category: Some(category),
                delay: Duration::ZERO,
                categorize_calls: AtomicUsize::new(0),
                list_queries: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                category: None,
                ..Self::default()
            }
        }

        /// Applies to every call, so list fetches stay observable while in flight.
        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn categorize_calls(&self) -> usize {
            self.categorize_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn list_queries(&self) -> Vec<String> {
            self.list_queries.lock().unwrap().clone()
        }

        async fn pause(&self) {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }

    fn server_error(e: crate::errors::AppError) -> ClientError {
        ClientError::Status {
            status: 500,
            body: e.to_string(),
        }
    }

    #[async_trait]
    impl NotesApi for FakeApi {
        async fn list(&self, query: &str) -> Result<Vec<Note>, ClientError> {
            self.list_queries.lock().unwrap().push(query.to_string());
            self.pause().await;
            self.store.search(Some(query)).await.map_err(server_error)
        }

        async fn create(&self, input: &NoteInput) -> Result<Note, ClientError> {
            self.pause().await;
            self.store.create(input).await.map_err(server_error)
        }

        async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Note, ClientError> {
            self.pause().await;
            self.store
                .update(id, input)
                .await
                .map_err(server_error)?
                .ok_or(ClientError::Status {
                    status: 404,
                    body: format!("Note {id} not found"),
                })
        }

        async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
            self.pause().await;
            self.store.delete(id).await.map_err(server_error)?;
            Ok(())
        }

        async fn categorize(&self, _text: &str) -> Result<Category, ClientError> {
            self.categorize_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            self.category.ok_or(ClientError::Status {
                status: 500,
                body: "Failed to categorize note".to_string(),
            })
        }
    }
}
