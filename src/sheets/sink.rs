//! Writing contact records to the sheet.

use std::sync::Arc;

use tracing::{info, warn};

use super::row::SheetRow;
use super::{SheetStore, SheetsError};
use crate::models::ContactRecord;

/// Header range covering the eight columns.
const HEADER_RANGE: &str = "A1:H1";
/// Anchor for appends; the API finds the table end from here.
const APPEND_RANGE: &str = "A1";
/// Full data range for reads.
const DATA_RANGE: &str = "A:H";

/// What [`RecordSink::ensure_header`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// The range was empty and the header was written.
    Created,
    /// The header was already in place.
    Present,
    /// Something else occupies the first row; it is left untouched.
    Mismatched,
}

/// Appends contact records as rows of one sheet.
#[derive(Clone)]
pub struct RecordSink {
    store: Arc<dyn SheetStore>,
    sheet_name: Option<String>,
}

impl RecordSink {
    pub fn new(store: Arc<dyn SheetStore>, sheet_name: Option<String>) -> Self {
        Self { store, sheet_name }
    }

    /// Qualify an A1 range with the tab name, if one is configured.
    fn range(&self, a1: &str) -> String {
        match &self.sheet_name {
            Some(name) => format!("'{}'!{}", name.replace('\'', "''"), a1),
            None => a1.to_string(),
        }
    }

    /// Write the header row if the sheet has none.
    ///
    /// Safe to call any number of times. Two callers racing on an empty sheet
    /// both write the same labels.
    pub async fn ensure_header(&self) -> Result<HeaderState, SheetsError> {
        let range = self.range(HEADER_RANGE);
        let rows = self.store.get_values(&range).await?;

        let Some(first) = rows.into_iter().next().filter(|r| !r.is_empty()) else {
            self.store
                .update_values(&range, vec![SheetRow::header().into_cells()])
                .await?;
            info!("Sheet headers initialized");
            return Ok(HeaderState::Created);
        };

        if first.len() == 8 && SheetRow::from_cells(first).is_header() {
            Ok(HeaderState::Present)
        } else {
            warn!("First sheet row is not the expected header; leaving it as-is");
            Ok(HeaderState::Mismatched)
        }
    }

    /// Append one record as a new row.
    pub async fn append(&self, record: &ContactRecord) -> Result<(), SheetsError> {
        let row = SheetRow::from_record(record);
        self.store
            .append_values(&self.range(APPEND_RANGE), vec![row.into_cells()])
            .await?;
        info!("Successfully appended data for {}", record.label());
        Ok(())
    }

    /// Read back every stored contact, skipping the header and rows that
    /// cannot be parsed.
    pub async fn list_records(&self) -> Result<Vec<ContactRecord>, SheetsError> {
        let rows = self.store.get_values(&self.range(DATA_RANGE)).await?;

        let mut records = Vec::with_capacity(rows.len());
        for (index, cells) in rows.into_iter().enumerate() {
            let row = SheetRow::from_cells(cells);
            if index == 0 && row.is_header() {
                continue;
            }
            match row.to_record() {
                Ok(record) => records.push(record),
                Err(reason) => warn!("Skipping sheet row {}: {}", index + 1, reason),
            }
        }
        Ok(records)
    }
}
