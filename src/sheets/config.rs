//! Spreadsheet configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the Google Sheets store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet ID (the long token in the sheet URL)
    #[serde(default)]
    pub sheet_id: Option<String>,
    /// Service account key file; tokens are minted from it on demand
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// Fixed OAuth access token; takes precedence over `credentials_file`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Tab name; the first tab is used when unset
    #[serde(default)]
    pub sheet_name: Option<String>,
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            sheet_id: None,
            credentials_file: None,
            access_token: None,
            sheet_name: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SheetsConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GOOGLE_SHEET_ID`: Spreadsheet ID
    /// - `GOOGLE_APPLICATION_CREDENTIALS`: Service account key file
    /// - `GOOGLE_SHEETS_ACCESS_TOKEN`: Fixed OAuth bearer token
    /// - `GOOGLE_SHEET_NAME`: Tab name
    /// - `GOOGLE_SHEETS_ENDPOINT`: API base URL
    /// - `GOOGLE_SHEETS_TIMEOUT_SECS`: Request timeout
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GOOGLE_SHEET_ID") {
            self.sheet_id = Some(val);
        }
        if let Ok(val) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.credentials_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("GOOGLE_SHEETS_ACCESS_TOKEN") {
            self.access_token = Some(val);
        }
        if let Ok(val) = std::env::var("GOOGLE_SHEET_NAME") {
            self.sheet_name = Some(val);
        }
        if let Ok(val) = std::env::var("GOOGLE_SHEETS_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("GOOGLE_SHEETS_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_credentials(mut self, sheet_id: &str, access_token: &str) -> Self {
        self.sheet_id = Some(sheet_id.to_string());
        self.access_token = Some(access_token.to_string());
        self
    }

    pub fn with_service_account(mut self, sheet_id: &str, key_file: impl Into<PathBuf>) -> Self {
        self.sheet_id = Some(sheet_id.to_string());
        self.credentials_file = Some(key_file.into());
        self
    }
}
