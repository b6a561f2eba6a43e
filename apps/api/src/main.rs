use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notes_api::config::Config;
use notes_api::db::create_pool;
use notes_api::inference::InferenceClient;
use notes_api::notes::{InMemoryNoteStore, NoteStore, PgNoteStore};
use notes_api::routes::build_router;
use notes_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Notes API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the note store
    let notes: Arc<dyn NoteStore> = match &config.database_url {
        Some(url) => Arc::new(PgNoteStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; notes are kept in memory and lost on exit");
            Arc::new(InMemoryNoteStore::new())
        }
    };

    // Initialize inference client
    let inference = InferenceClient::new(&config)?;
    info!(
        "Inference client initialized (max retries: {})",
        config.max_retries
    );

    let state = AppState {
        notes: notes.clone(),
        inference,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    notes.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
