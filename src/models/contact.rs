//! Contact data extracted from business cards.
//!
//! A [`ContactCandidate`] is what the vision model said, loosely typed. A
//! [`ContactRecord`] is the normalized entity that gets timestamped, written to
//! the sheet and returned to the caller as a [`DisplayContact`].

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields a card must carry to be considered complete.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "business_name", "contact_number"];

/// Outcome of writing a record to the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    /// No write attempted yet.
    #[default]
    Unset,
    /// Row appended.
    Saved,
    /// Append failed; the record is still returned to the caller.
    Failed,
}

impl SheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetStatus::Unset => "unset",
            SheetStatus::Saved => "saved",
            SheetStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SheetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Contact fields as parsed from a model response, before any checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactCandidate {
    pub name: Option<String>,
    pub business_name: Option<String>,
    pub job_title: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
}

impl ContactCandidate {
    /// Build a candidate from one JSON object of the model response.
    ///
    /// Keys are looked up under the canonical name first, then under the
    /// spellings vision models commonly fall back to ("company", "phone", ...).
    /// Unknown keys are ignored.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            name: lookup(obj, &["name", "full_name"]),
            business_name: lookup(
                obj,
                &["business_name", "businessName", "business name", "company"],
            ),
            job_title: lookup(obj, &["job_title", "jobTitle", "job title", "title", "position"]),
            contact_number: lookup(
                obj,
                &[
                    "contact_number",
                    "contactNumber",
                    "contact number",
                    "phone",
                    "phone_number",
                ],
            ),
            email: lookup(obj, &["email", "email_address"]),
            website: lookup(obj, &["website", "url"]),
            address: lookup(obj, &["address"]),
        }
    }

    /// Required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [&self.name, &self.business_name, &self.contact_number];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, v)| v.as_deref().map_or(true, str::is_empty))
            .map(|(field, _)| *field)
            .collect()
    }
}

fn lookup(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(value_to_text)
}

/// Render a JSON value as trimmed text. Blank strings and null are absent.
///
/// Lists (several phone numbers) and flat objects (a structured address) are
/// joined with ", " so nothing the model returned is silently dropped.
fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => join_texts(items.iter()),
        Value::Object(map) => join_texts(map.values()),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn join_texts<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .filter_map(value_to_text)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A normalized contact, timestamped at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub name: String,
    pub business_name: String,
    pub job_title: Option<String>,
    pub contact_number: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    created_at: DateTime<Utc>,
    sheet_status: SheetStatus,
}

impl ContactRecord {
    /// Normalize a candidate. Missing required fields become empty strings.
    ///
    /// `created_at` is truncated to whole seconds, the precision the sheet keeps.
    pub fn from_candidate(candidate: ContactCandidate, created_at: DateTime<Utc>) -> Self {
        Self {
            name: candidate.name.unwrap_or_default(),
            business_name: candidate.business_name.unwrap_or_default(),
            job_title: candidate.job_title,
            contact_number: candidate.contact_number.unwrap_or_default(),
            email: candidate.email,
            website: candidate.website,
            address: candidate.address,
            created_at: created_at.trunc_subsecs(0),
            sheet_status: SheetStatus::Unset,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn sheet_status(&self) -> SheetStatus {
        self.sheet_status
    }

    /// Record the outcome of the sheet write.
    ///
    /// Only the first transition away from `Unset` takes effect; returns whether
    /// this call changed the status.
    pub fn set_sheet_status(&mut self, status: SheetStatus) -> bool {
        if self.sheet_status != SheetStatus::Unset || status == SheetStatus::Unset {
            return false;
        }
        self.sheet_status = status;
        true
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.business_name.is_empty() && !self.contact_number.is_empty()
    }

    /// Name used in log lines.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }

    pub fn to_display(&self) -> DisplayContact {
        DisplayContact {
            name: self.name.clone(),
            company: self.business_name.clone(),
            position: self.job_title.clone(),
            phone: self.contact_number.clone(),
            email: self.email.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            sheet_status: self.sheet_status,
        }
    }
}

/// Caller-facing contact shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayContact {
    pub name: String,
    pub company: String,
    pub position: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub sheet_status: SheetStatus,
}
