//! Mapping between contact records and sheet rows.

use chrono::NaiveDateTime;

use crate::models::{ContactCandidate, ContactRecord, SheetStatus};

/// Column labels, in sheet order.
pub const SHEET_COLUMNS: [&str; 8] = [
    "Name",
    "Business Name",
    "Job Title",
    "Contact Number",
    "Email",
    "Website",
    "Address",
    "Created At",
];

/// Timestamp format of the `Created At` column (UTC).
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One data row: eight cells in [`SHEET_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    cells: [String; 8],
}

impl SheetRow {
    /// The header row.
    pub fn header() -> Self {
        Self {
            cells: SHEET_COLUMNS.map(str::to_string),
        }
    }

    /// Row for a record. Absent optional fields become empty cells.
    pub fn from_record(record: &ContactRecord) -> Self {
        let optional = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            cells: [
                record.name.clone(),
                record.business_name.clone(),
                optional(&record.job_title),
                record.contact_number.clone(),
                optional(&record.email),
                optional(&record.website),
                optional(&record.address),
                record.created_at().format(CREATED_AT_FORMAT).to_string(),
            ],
        }
    }

    /// Row from cells as read back from the sheet. Short rows are padded
    /// with empty cells; extra cells are dropped.
    pub fn from_cells(cells: Vec<String>) -> Self {
        let mut iter = cells.into_iter();
        Self {
            cells: std::array::from_fn(|_| iter.next().unwrap_or_default()),
        }
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells.into()
    }

    /// True if the cells match the column labels exactly.
    pub fn is_header(&self) -> bool {
        self.cells.iter().zip(SHEET_COLUMNS).all(|(cell, label)| cell == label)
    }

    /// Rebuild the stored record. Empty cells read back as absent fields.
    ///
    /// Rows come from the sheet, so the record is marked saved.
    pub fn to_record(&self) -> Result<ContactRecord, String> {
        let cell = |i: usize| {
            let value = self.cells[i].trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        let created_at = NaiveDateTime::parse_from_str(self.cells[7].trim(), CREATED_AT_FORMAT)
            .map_err(|e| format!("bad Created At {:?}: {}", self.cells[7], e))?
            .and_utc();

        let candidate = ContactCandidate {
            name: cell(0),
            business_name: cell(1),
            job_title: cell(2),
            contact_number: cell(3),
            email: cell(4),
            website: cell(5),
            address: cell(6),
        };
        let mut record = ContactRecord::from_candidate(candidate, created_at);
        record.set_sheet_status(SheetStatus::Saved);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(job_title: Option<&str>, email: Option<&str>) -> ContactRecord {
        ContactRecord::from_candidate(
            ContactCandidate {
                name: Some("Jane Doe".into()),
                business_name: Some("Acme".into()),
                job_title: job_title.map(Into::into),
                contact_number: Some("555-1212".into()),
                email: email.map(Into::into),
                website: None,
                address: Some("1 Main St, Springfield".into()),
            },
            Utc.with_ymd_and_hms(2024, 3, 9, 8, 5, 0).unwrap(),
        )
    }

    #[test]
    fn test_column_order() {
        let row = SheetRow::from_record(&record(Some("CTO"), Some("jane@acme.test")));
        assert_eq!(
            row.into_cells(),
            vec![
                "Jane Doe",
                "Acme",
                "CTO",
                "555-1212",
                "jane@acme.test",
                "",
                "1 Main St, Springfield",
                "2024-03-09 08:05:00",
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        for original in [
            record(Some("CTO"), Some("jane@acme.test")),
            record(None, None),
        ] {
            let mut expected = original.clone();
            expected.set_sheet_status(SheetStatus::Saved);

            let row = SheetRow::from_record(&original);
            let restored = SheetRow::from_cells(row.clone().into_cells()).to_record().unwrap();
            assert_eq!(restored, expected);
            assert_eq!(SheetRow::from_record(&restored), row);
        }
    }

    #[test]
    fn test_short_row_is_padded() {
        let row = SheetRow::from_cells(vec!["Jane".into(), "Acme".into()]);
        assert!(row.to_record().is_err());
        let cells = row.into_cells();
        assert_eq!(cells[2], "");
        assert_eq!(cells[7], "");
    }

    #[test]
    fn test_header() {
        assert!(SheetRow::header().is_header());
        assert!(!SheetRow::from_record(&record(None, None)).is_header());
        assert!(!SheetRow::from_cells(vec!["Name".into()]).is_header());
    }
}
