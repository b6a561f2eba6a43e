//! Note editor form.
//!
//! Holds `title`, `content` and `category`. Once the content grows past the
//! configured word count, categorization runs in a background task and its
//! result overwrites the selected category, even if the user picked one
//! manually while the call was in flight.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::client::api::NotesApi;
use crate::models::{Category, Note, NoteInput};

pub const ANALYZING_LABEL: &str = "Analyzing...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorForm {
    pub title: String,
    pub content: String,
    pub category: Category,
}

impl Default for EditorForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: Category::Work,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError<E> {
    #[error("invalid note: {}", .0.join(" "))]
    Invalid(Vec<String>),

    #[error("save failed: {0}")]
    Save(E),
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub struct NoteEditor {
    api: Arc<dyn NotesApi>,
    form: Arc<Mutex<EditorForm>>,
    in_flight: Arc<AtomicUsize>,
    editing: Mutex<Option<Uuid>>,
    minimum_keyword_length: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One outstanding analysis. Dropping it clears the count even if the task
/// is aborted or the categorizer panics.
struct Analyzing(Arc<AtomicUsize>);

impl Analyzing {
    fn start(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for Analyzing {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl NoteEditor {
    pub fn new(api: Arc<dyn NotesApi>, minimum_keyword_length: usize) -> Self {
        Self {
            api,
            form: Arc::new(Mutex::new(EditorForm::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            editing: Mutex::new(None),
            minimum_keyword_length,
        }
    }

    /// Pre-populates the form from `note`, or leaves it untouched for `None`.
    ///
    /// Loading counts as a content change, so a long enough note is re-categorized.
    pub fn load(&self, note: Option<&Note>) -> Option<JoinHandle<()>> {
        let note = note?;
        *lock(&self.editing) = Some(note.id);
        {
            let mut form = lock(&self.form);
            form.title = note.title.clone();
            form.category = note.category.unwrap_or_default();
        }
        self.set_content(note.content.clone())
    }

    /// Leaves edit mode. Field values are kept.
    pub fn clear_editing(&self) {
        *lock(&self.editing) = None;
    }

    pub fn editing(&self) -> Option<Uuid> {
        *lock(&self.editing)
    }

    pub fn form(&self) -> EditorForm {
        lock(&self.form).clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        lock(&self.form).title = title.into();
    }

    pub fn set_category(&self, category: Category) {
        lock(&self.form).category = category;
    }

    /// Updates the content and, past the word threshold, starts categorization
    /// on the current tokio runtime. Returns the background task so callers can
    /// wait for it. Outside a runtime the content is still stored but no
    /// analysis runs.
    pub fn set_content(&self, content: impl Into<String>) -> Option<JoinHandle<()>> {
        let content = content.into();
        lock(&self.form).content = content.clone();

        if content.is_empty() || word_count(&content) <= self.minimum_keyword_length {
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("No tokio runtime available, skipping content analysis");
            return None;
        };
        Some(self.analyze(&runtime, content))
    }

    fn analyze(&self, runtime: &Handle, text: String) -> JoinHandle<()> {
        let api = self.api.clone();
        let form = self.form.clone();
        let analyzing = Analyzing::start(&self.in_flight);

        runtime.spawn(async move {
            let _analyzing = analyzing;
            match api.categorize(&text).await {
                Ok(category) => {
                    debug!("Content categorized as {category}");
                    lock(&form).category = category;
                }
                Err(e) => error!("Error analyzing content: {e}"),
            }
        })
    }

    pub fn is_analyzing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// What sits where the category selector is drawn.
    pub fn category_display(&self) -> String {
        if self.is_analyzing() {
            ANALYZING_LABEL.to_string()
        } else {
            lock(&self.form).category.to_string()
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.editing().is_some() {
            "Update Note"
        } else {
            "Add Note"
        }
    }

    fn input(&self) -> NoteInput {
        let form = lock(&self.form);
        NoteInput {
            title: form.title.clone(),
            content: form.content.clone(),
            category: Some(form.category),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        self.input().validate()
    }

    /// Hands the form to `on_save`; once it succeeds, title and content are
    /// cleared and the category is kept for the next note.
    pub async fn submit<F, Fut, E>(&self, on_save: F) -> Result<(), SubmitError<E>>
    where
        F: FnOnce(NoteInput) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let input = self.input();
        input.validate().map_err(SubmitError::Invalid)?;

        on_save(input).await.map_err(SubmitError::Save)?;

        let mut form = lock(&self.form);
        form.title.clear();
        form.content.clear();
        Ok(())
    }
}
