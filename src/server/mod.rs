//! HTTP surface for document analysis.
//!
//! - `POST /api/analyze` (and the `/api/analyze-document` alias): analyze
//!   one base64-encoded upload
//! - `GET /health`: liveness plus whether AI extraction is configured

mod handlers;
mod routes;

pub use handlers::{AnalyzeBody, AnalyzeResponse, ErrorResponse, HealthResponse};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Settings;
use crate::llm::{AiExtractor, GeminiBackend};
use crate::repository::{InMemoryRecordStore, RecordStore, SqliteRecordStore};
use crate::services::Orchestrator;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Largest accepted request body, base64 overhead included.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, max_body_bytes: usize) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            max_body_bytes,
        }
    }

    /// Wire up the AI backend and record store described by `settings`.
    ///
    /// With `persist` false nothing is stored and `letter_id` is always null.
    pub fn from_settings(settings: &Settings, persist: bool) -> anyhow::Result<Self> {
        let orchestrator = build_orchestrator(settings, persist)?;
        Ok(Self::new(orchestrator, settings.max_upload_bytes))
    }
}

/// Build an orchestrator from settings.
pub fn build_orchestrator(settings: &Settings, persist: bool) -> anyhow::Result<Orchestrator> {
    let ai = if settings.ai.is_configured() {
        let backend = GeminiBackend::new(settings.ai.clone())?;
        info!(
            "AI extraction enabled (fast: {}, thorough: {})",
            settings.ai.fast_model, settings.ai.thorough_model
        );
        Some(AiExtractor::new(Arc::new(backend), settings.ai.clone()))
    } else {
        warn!("AI extraction not configured; images and scanned PDFs will be rejected");
        None
    };

    let store: Option<Arc<dyn RecordStore>> = if !persist {
        None
    } else if settings.is_in_memory() {
        Some(Arc::new(InMemoryRecordStore::new()))
    } else {
        info!("Storing analyses in {}", settings.database_path.display());
        Some(Arc::new(SqliteRecordStore::open(&settings.database_path)?))
    };

    Ok(Orchestrator::new(ai, store)
        .with_store_timeout(Duration::from_secs(settings.store_timeout_secs)))
}

/// Start the web server and run until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = bind.parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, draining connections");
}
