//! Notes list page: debounced search, list view, and the save/delete wiring
//! between the editor and the notes API.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::error;
use uuid::Uuid;

use crate::client::api::{ClientError, NotesApi};
use crate::client::debounce::Debouncer;
use crate::client::editor::{NoteEditor, SubmitError};
use crate::config::Config;
use crate::models::{Note, NoteInput};

pub const EMPTY_PLACEHOLDER: &str = "No notes found.";
pub const LOADING_PLACEHOLDER: &str = "Loading...";

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub search_debounce: Duration,
    pub minimum_keyword_length: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(500),
            minimum_keyword_length: 3,
        }
    }
}

impl From<&Config> for PageSettings {
    fn from(config: &Config) -> Self {
        Self {
            search_debounce: config.search_debounce,
            minimum_keyword_length: config.minimum_keyword_length,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotesView {
    Loading,
    Empty,
    Notes(Vec<Note>),
}

impl NotesView {
    /// One display line per list row.
    pub fn lines(&self) -> Vec<String> {
        match self {
            NotesView::Loading => vec![LOADING_PLACEHOLDER.to_string()],
            NotesView::Empty => vec![EMPTY_PLACEHOLDER.to_string()],
            NotesView::Notes(notes) => notes
                .iter()
                .map(|note| {
                    let category = note.category.map(|c| c.as_str()).unwrap_or("");
                    format!("{} - [{}] {}", note.title, category, note.content)
                })
                .collect(),
        }
    }
}

#[derive(Default)]
struct PageState {
    search: String,
    notes: Vec<Note>,
    in_flight: usize,
    issued: u64,
    applied: u64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps `in_flight` accurate even when a debounced fetch is aborted mid-request.
struct InFlight(Arc<Mutex<PageState>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.0).in_flight -= 1;
    }
}

/// Lists notes for `query` into `state`. Responses older than one already
/// applied are dropped; failures are logged and the previous list is kept.
fn fetch_notes(
    api: Arc<dyn NotesApi>,
    state: Arc<Mutex<PageState>>,
    query: String,
) -> impl Future<Output = ()> + Send + 'static {
    async move {
        let seq = {
            let mut st = lock(&state);
            st.in_flight += 1;
            st.issued += 1;
            st.issued
        };
        let _guard = InFlight(state.clone());

        match api.list(&query).await {
            Ok(notes) => {
                let mut st = lock(&state);
                if seq > st.applied {
                    st.applied = seq;
                    st.notes = notes;
                }
            }
            Err(e) => error!("Failed to fetch notes: {e}"),
        }
    }
}

pub struct NotesPage {
    api: Arc<dyn NotesApi>,
    state: Arc<Mutex<PageState>>,
    debouncer: Debouncer,
    editor: NoteEditor,
}

impl NotesPage {
    pub fn new(api: Arc<dyn NotesApi>, settings: PageSettings) -> Self {
        Self {
            editor: NoteEditor::new(api.clone(), settings.minimum_keyword_length),
            debouncer: Debouncer::new(settings.search_debounce),
            state: Arc::new(Mutex::new(PageState::default())),
            api,
        }
    }

    /// Fetches the list for the current search text right away.
    pub async fn refresh(&self) {
        let query = self.search();
        fetch_notes(self.api.clone(), self.state.clone(), query).await;
    }

    /// Updates the search text immediately; the fetch waits for typing to pause.
    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        lock(&self.state).search = text.clone();
        self.debouncer
            .call(fetch_notes(self.api.clone(), self.state.clone(), text));
    }

    pub fn search(&self) -> String {
        lock(&self.state).search.clone()
    }

    pub fn view(&self) -> NotesView {
        let st = lock(&self.state);
        if st.in_flight > 0 {
            NotesView::Loading
        } else if st.notes.is_empty() {
            NotesView::Empty
        } else {
            NotesView::Notes(st.notes.clone())
        }
    }

    pub fn editor(&self) -> &NoteEditor {
        &self.editor
    }

    /// Opens `note` in the editor; saves then update it instead of creating.
    pub fn start_editing(&self, note: &Note) -> Option<JoinHandle<()>> {
        self.editor.load(Some(note))
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editor.editing()
    }

    /// Updates the note being edited, or creates a new one, then leaves edit
    /// mode and re-fetches the list.
    pub async fn save(&self, input: NoteInput) -> Result<(), ClientError> {
        let result = match self.editor.editing() {
            Some(id) => self.api.update(id, &input).await.map(|_| ()),
            None => self.api.create(&input).await.map(|_| ()),
        };
        if let Err(e) = result {
            error!("Operation failed: {e}");
            return Err(e);
        }

        self.editor.clear_editing();
        self.refresh().await;
        Ok(())
    }

    /// Submits the editor through `save`.
    pub async fn submit_editor(&self) -> Result<(), SubmitError<ClientError>> {
        self.editor.submit(|input| self.save(input)).await
    }

    pub async fn delete(&self, id: Uuid) {
        if let Err(e) = self.api.delete(id).await {
            error!("Failed to delete note {id}: {e}");
        }
        self.refresh().await;
    }
}
