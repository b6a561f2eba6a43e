// Note persistence and its HTTP surface.
// Handlers only see `Arc<dyn NoteStore>`; the backend is picked at startup.

pub mod handlers;
pub mod memory;
pub mod store;

pub use memory::InMemoryNoteStore;
pub use store::{NoteStore, PgNoteStore};
