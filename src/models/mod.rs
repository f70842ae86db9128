//! Data models for cardscan.

mod contact;
mod upload;

pub use contact::{
    ContactCandidate, ContactRecord, DisplayContact, SheetStatus, REQUIRED_FIELDS,
};
pub use upload::{ImageReader, UploadedImage};
