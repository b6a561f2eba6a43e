use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Note, NoteInput};
use crate::notes::store::{normalize_query, validate_input, NoteStore};

/// Process-local store used when no database is configured, and in tests.
/// Notes are kept in insertion order.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<Vec<Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_needle(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Note>, AppError> {
        let notes = self.notes.read().await;
        let needle = normalize_query(query).map(str::to_lowercase);

        // Reverse first so equal timestamps still come back newest-inserted first.
        let mut found: Vec<Note> = notes
            .iter()
            .rev()
            .filter(|note| needle.as_deref().map_or(true, |n| contains_needle(note, n)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create(&self, input: &NoteInput) -> Result<Note, AppError> {
        validate_input(input)?;

        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            content: input.content.clone(),
            category: input.category,
            sentiment: None,
            summary: None,
            created_at: now,
            updated_at: now,
        };
        self.notes.write().await.push(note.clone());

        info!("Created note {}", note.id);
        Ok(note)
    }

    async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Option<Note>, AppError> {
        validate_input(input)?;

        let mut notes = self.notes.write().await;
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        note.title = input.title.clone();
        note.content = input.content.clone();
        note.category = input.category;
        note.updated_at = Utc::now();

        info!("Updated note {id}");
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);

        let deleted = notes.len() < before;
        if deleted {
            info!("Deleted note {id}");
        }
        Ok(deleted)
    }
}
