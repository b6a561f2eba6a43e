pub mod note;

pub use note::{Category, Note, NoteInput, NoteRow, Sentiment};
