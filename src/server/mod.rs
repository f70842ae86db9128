//! Web server for uploading business cards.
//!
//! Exposes the batch pipeline over HTTP:
//! - `POST /analyze` takes multipart uploads and returns one entry per card
//! - `GET /api/contacts` reads back what the sheet holds
//! - `GET /health` for liveness checks

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use handlers::AnalyzeResponse;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::BatchOrchestrator;
use crate::sheets::{GoogleSheetsClient, RecordSink};
use crate::vision::OpenAiVisionClient;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub sink: RecordSink,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(orchestrator: BatchOrchestrator, max_upload_bytes: usize) -> Self {
        let sink = orchestrator.sink().clone();
        Self {
            orchestrator: Arc::new(orchestrator),
            sink,
            max_upload_bytes,
        }
    }

    /// Build the live clients from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let orchestrator = build_orchestrator(settings)?;
        Ok(Self::new(orchestrator, settings.server.max_upload_bytes))
    }
}

/// Wire the OpenAI vision client and the Google Sheets sink together.
pub fn build_orchestrator(settings: &Settings) -> anyhow::Result<BatchOrchestrator> {
    let vision = OpenAiVisionClient::new(settings.vision.clone())?;
    Ok(BatchOrchestrator::new(Arc::new(vision), build_sink(settings)?))
}

/// Sink over the configured spreadsheet.
pub fn build_sink(settings: &Settings) -> anyhow::Result<RecordSink> {
    let store = GoogleSheetsClient::new(&settings.sheets)?;
    Ok(RecordSink::new(
        Arc::new(store),
        settings.sheets.sheet_name.clone(),
    ))
}

/// Start the web server.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
