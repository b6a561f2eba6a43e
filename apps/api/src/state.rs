use std::sync::Arc;

use crate::config::Config;
use crate::inference::InferenceClient;
use crate::notes::NoteStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Note backend, constructed in `main` and closed after shutdown.
    pub notes: Arc<dyn NoteStore>,
    pub inference: InferenceClient,
    pub config: Config,
}
