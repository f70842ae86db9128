//! Vision model access for reading business cards.
//!
//! The pipeline only needs one thing from a model: given an image, return the
//! raw completion text. [`VisionModel`] is that seam; [`OpenAiVisionClient`] is
//! the production implementation against an OpenAI-compatible API.

mod client;
pub mod codec;
mod config;
mod prompts;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::UploadedImage;

pub use client::OpenAiVisionClient;
pub use config::VisionConfig;
pub use prompts::DEFAULT_CARD_PROMPT;

/// Errors from a vision model call.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("vision API key not configured")]
    MissingApiKey,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unreadable API response: {0}")]
    Parse(String),

    #[error("model returned no choices")]
    NoChoices,
}

/// A model that turns one card image into free text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Analyze one image and return the completion verbatim.
    async fn analyze(&self, image: &mut UploadedImage) -> Result<String, VisionError>;
}
