//! Spreadsheet persistence for extracted contacts.
//!
//! The sheet is treated as an append-only table with one header row. The
//! store itself sits behind [`SheetStore`] so the sink logic does not depend on
//! Google's API.

mod client;
mod config;
mod row;
mod sink;

use async_trait::async_trait;
use thiserror::Error;

pub use client::GoogleSheetsClient;
pub use config::SheetsConfig;
pub use row::{SheetRow, CREATED_AT_FORMAT, SHEET_COLUMNS};
pub use sink::{HeaderState, RecordSink};

/// Errors from spreadsheet operations.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets not configured: {0} missing")]
    NotConfigured(&'static str),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("Sheets API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("unreadable Sheets response: {0}")]
    Parse(String),
}

/// Range-based access to a remote table.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read the rows in `range`. An empty range yields no rows.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Overwrite `range` with `rows`.
    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Append `rows` after the last row of the table found at `range`.
    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;
}
