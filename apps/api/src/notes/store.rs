use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Note, NoteInput, NoteRow};

/// Persistence seam for notes. Implement this to swap backends without
/// touching the handlers.
///
/// Carried in `AppState` as `Arc<dyn NoteStore>`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Notes whose title or content contains `query` (case-insensitive),
    /// newest first. `None` or an empty query returns every note.
    async fn search(&self, query: Option<&str>) -> Result<Vec<Note>, AppError>;

    async fn create(&self, input: &NoteInput) -> Result<Note, AppError>;

    /// Replaces title, content and category. `None` when no note has `id`.
    async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Option<Note>, AppError>;

    /// Removes the note if present. Returns whether anything was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Releases backend resources. Called once after the server stops.
    async fn close(&self) {}
}

pub(crate) fn validate_input(input: &NoteInput) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::Validation(errors.join(" ")))
}

/// Search term to filter on; an empty query means "everything".
pub(crate) fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.is_empty())
}

/// Escapes LIKE metacharacters so the query matches as a literal substring.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn into_note(row: NoteRow) -> Result<Note, AppError> {
    Note::try_from(row).map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt note row: {e}")))
}

/// PostgreSQL-backed store over the `notes` table.
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn search(&self, query: Option<&str>) -> Result<Vec<Note>, AppError> {
        let rows: Vec<NoteRow> = match normalize_query(query) {
            Some(q) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM notes
                    WHERE title ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\'
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(like_pattern(q))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM notes ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(into_note).collect()
    }

    async fn create(&self, input: &NoteInput) -> Result<Note, AppError> {
        validate_input(input)?;

        let row: NoteRow = sqlx::query_as(
            r#"
            INSERT INTO notes (title, content, category)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.category.map(|c| c.as_str()))
        .fetch_one(&self.pool)
        .await?;

        info!("Created note {}", row.id);
        into_note(row)
    }

    async fn update(&self, id: Uuid, input: &NoteInput) -> Result<Option<Note>, AppError> {
        validate_input(input)?;

        let row: Option<NoteRow> = sqlx::query_as(
            r#"
            UPDATE notes
            SET title = $1, content = $2, category = $3, updated_at = now()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.category.map(|c| c.as_str()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            info!("Updated note {id}");
        }
        row.map(into_note).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted note {id}");
        }
        Ok(deleted)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}
