//! Batch processing of uploaded card images.
//!
//! Each image runs through analyze -> extract -> save independently. A failure
//! at any stage becomes an entry in the result instead of aborting the batch,
//! so the caller always gets one or more entries per image, in upload order.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::extract::extract;
use crate::models::{ContactRecord, DisplayContact, SheetStatus, UploadedImage};
use crate::sheets::RecordSink;
use crate::vision::VisionModel;

/// Message for an image whose completion held zero cards.
pub const NO_CONTACT_DATA: &str = "No contact data could be extracted";

/// Errors that reject a whole batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("No images provided")]
    NoImages,
}

/// An image that produced no contacts, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFailure {
    pub error: String,
    pub image: String,
}

/// One item of a batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Contact(DisplayContact),
    Failure(ImageFailure),
}

impl BatchEntry {
    fn failure(image: &str, error: impl Into<String>) -> Self {
        BatchEntry::Failure(ImageFailure {
            error: error.into(),
            image: image.to_string(),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BatchEntry::Failure(_))
    }
}

/// Drives the extraction pipeline over a batch of images.
#[derive(Clone)]
pub struct BatchOrchestrator {
    vision: Arc<dyn VisionModel>,
    sink: RecordSink,
}

impl BatchOrchestrator {
    pub fn new(vision: Arc<dyn VisionModel>, sink: RecordSink) -> Self {
        Self { vision, sink }
    }

    pub fn sink(&self) -> &RecordSink {
        &self.sink
    }

    /// Process every image in order and collect the outcomes.
    ///
    /// Only an empty batch is an error; per-image and per-record failures are
    /// reported as entries.
    pub async fn process(&self, images: Vec<UploadedImage>) -> Result<Vec<BatchEntry>, BatchError> {
        if images.is_empty() {
            return Err(BatchError::NoImages);
        }

        info!(
            "Processing batch of {} images with {}",
            images.len(),
            self.vision.model_name()
        );

        let mut run = BatchRun {
            entries: Vec::with_capacity(images.len()),
            header_checked: false,
        };
        for mut image in images {
            self.process_image(&mut image, &mut run).await;
        }

        let failures = run.entries.iter().filter(|e| e.is_failure()).count();
        info!(
            "Batch complete: {} contacts, {} failed images",
            run.entries.len() - failures,
            failures
        );
        Ok(run.entries)
    }

    async fn process_image(&self, image: &mut UploadedImage, run: &mut BatchRun) {
        let name = image.name().to_string();
        info!("Processing image: {} ({} bytes)", name, image.size());

        let raw = match self.vision.analyze(image).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("[{}] analyze: image analysis failed: {}", name, e);
                run.entries
                    .push(BatchEntry::failure(&name, format!("Image analysis failed: {}", e)));
                return;
            }
        };

        let candidates = match extract(&raw) {
            Ok(candidates) => candidates,
            Err(e) => {
                if e.is_malformed() {
                    error!("[{}] extract: malformed model response: {}", name, e);
                } else {
                    warn!("[{}] extract: {}", name, e);
                }
                run.entries.push(BatchEntry::failure(
                    &name,
                    format!("Failed to extract card details: {}", e),
                ));
                return;
            }
        };

        if candidates.is_empty() {
            warn!("[{}] extract: no cards in response", name);
            run.entries.push(BatchEntry::failure(&name, NO_CONTACT_DATA));
            return;
        }

        for candidate in candidates {
            let mut record = ContactRecord::from_candidate(candidate, Utc::now());
            self.save(&name, &mut record, run).await;
            run.entries.push(BatchEntry::Contact(record.to_display()));
        }
    }

    /// Best-effort sheet write; the outcome lands in `sheet_status`.
    async fn save(&self, image: &str, record: &mut ContactRecord, run: &mut BatchRun) {
        if !run.header_checked {
            run.header_checked = true;
            if let Err(e) = self.sink.ensure_header().await {
                warn!("[{}] save: failed to initialize sheet header: {}", image, e);
            }
        }

        let status = match self.sink.append(record).await {
            Ok(()) => {
                info!("Added card for {} to Google Sheet", record.label());
                SheetStatus::Saved
            }
            Err(e) => {
                error!(
                    "[{}] save: failed to add {} to Google Sheet: {}",
                    image,
                    record.label(),
                    e
                );
                SheetStatus::Failed
            }
        };
        record.set_sheet_status(status);
    }
}

/// Per-call accumulator; nothing here outlives one `process` call.
struct BatchRun {
    entries: Vec<BatchEntry>,
    header_checked: bool,
}
