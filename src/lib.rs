//! cardscan - business card scanning into a Google Sheet.
//!
//! Photos of business cards go through a vision model, the completion is
//! parsed into contact records, and each record is appended to a spreadsheet.

pub mod cli;
pub mod config;
pub mod extract;
pub mod models;
pub mod server;
pub mod services;
pub mod sheets;
pub mod vision;

#[cfg(test)]
pub(crate) mod test_support;
