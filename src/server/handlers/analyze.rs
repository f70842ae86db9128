//! Card upload endpoint.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

use super::super::{ApiError, AppState};
use crate::models::UploadedImage;
use crate::services::BatchEntry;

/// Multipart field carrying the uploaded cards.
const IMAGES_FIELD: &str = "images";
/// Single-file field accepted from older clients.
const LEGACY_IMAGE_FIELD: &str = "image";

/// Body of a successful `POST /analyze`.
///
/// Entries sit under `results`, the key the browser batch client reads.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub results: Vec<BatchEntry>,
}

/// Analyze every uploaded card and append the results to the sheet.
///
/// The batch runs on its own task so a panic inside the pipeline becomes a
/// 500 instead of a dropped connection.
pub async fn analyze_cards(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let images = read_images(&mut multipart).await?;
    info!("Received {} images for analysis", images.len());

    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.process(images).await })
        .await
        .map_err(|e| {
            error!("Batch task failed: {}", e);
            ApiError::Internal(format!("Internal server error: {}", e))
        })?;

    let results = outcome.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(AnalyzeResponse {
        success: true,
        results,
    }))
}

/// Collect the image parts of a multipart body, in upload order.
///
/// Parts with no filename and no content are empty file inputs and are
/// skipped. Parts under other field names are ignored.
async fn read_images(multipart: &mut Multipart) -> Result<Vec<UploadedImage>, ApiError> {
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != IMAGES_FIELD && field_name != LEGACY_IMAGE_FIELD {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if file_name.is_empty() && bytes.is_empty() {
            continue;
        }

        let name = if file_name.is_empty() {
            format!("{}-{}", field_name, images.len() + 1)
        } else {
            file_name
        };
        images.push(UploadedImage::new(name, content_type, bytes.to_vec()));
    }

    Ok(images)
}
