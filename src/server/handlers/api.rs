//! Read-only API endpoint handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use super::super::{ApiError, AppState};
use crate::models::{ContactRecord, DisplayContact};

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// Every contact stored in the sheet, in sheet order.
pub async fn api_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<DisplayContact>>, ApiError> {
    let records = state.sink.list_records().await.map_err(|e| {
        error!("Error fetching sheet data: {}", e);
        ApiError::BadGateway(format!("Failed to read Google Sheet: {}", e))
    })?;

    Ok(Json(records.iter().map(ContactRecord::to_display).collect()))
}
