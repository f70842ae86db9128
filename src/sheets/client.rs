//! Google Sheets v4 values API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{SheetStore, SheetsConfig, SheetsError};

/// OAuth scope for reading and writing spreadsheets.
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Where bearer tokens come from.
enum Credentials {
    Static(String),
    /// Minted from a service account key; the provider caches and refreshes.
    ServiceAccount(Arc<dyn TokenProvider>),
}

/// [`SheetStore`] backed by one Google spreadsheet.
pub struct GoogleSheetsClient {
    client: Client,
    endpoint: String,
    sheet_id: String,
    credentials: Credentials,
    timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ValueRange<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'a str,
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GoogleSheetsClient {
    /// Create a client for the configured sheet.
    ///
    /// A fixed access token is used when set. Otherwise the service account
    /// key file is loaded here, and tokens are minted from it per request.
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let sheet_id = config
            .sheet_id
            .clone()
            .ok_or(SheetsError::NotConfigured("GOOGLE_SHEET_ID"))?;
        let credentials = load_credentials(config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SheetsError::Connection(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            sheet_id,
            credentials,
            timeout_secs: config.timeout_secs,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.endpoint,
            urlencoding::encode(&self.sheet_id),
            urlencoding::encode(range)
        )
    }

    async fn bearer_token(&self) -> Result<String, SheetsError> {
        match &self.credentials {
            Credentials::Static(token) => Ok(token.clone()),
            Credentials::ServiceAccount(provider) => {
                let token = provider
                    .token(&[SPREADSHEETS_SCOPE])
                    .await
                    .map_err(|e| SheetsError::Auth(e.to_string()))?;
                Ok(token.as_str().to_string())
            }
        }
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, SheetsError> {
        let token = self.bearer_token().await?;
        let resp = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify_send_error(e))?;
        if !status.is_success() {
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }
        Ok(body)
    }

    fn classify_send_error(&self, e: reqwest::Error) -> SheetsError {
        if e.is_timeout() {
            SheetsError::Timeout(self.timeout_secs)
        } else {
            SheetsError::Connection(e.to_string())
        }
    }
}

fn load_credentials(config: &SheetsConfig) -> Result<Credentials, SheetsError> {
    if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Credentials::Static(token.to_string()));
    }

    let path = config
        .credentials_file
        .as_deref()
        .ok_or(SheetsError::NotConfigured("GOOGLE_APPLICATION_CREDENTIALS"))?;
    let account = CustomServiceAccount::from_file(path)
        .map_err(|e| SheetsError::Auth(format!("{}: {}", path.display(), e)))?;
    info!("Using service account credentials from {}", path.display());
    Ok(Credentials::ServiceAccount(Arc::new(account)))
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        debug!("Sheets GET {}", range);
        let body = self.execute(self.client.get(self.values_url(range))).await?;
        let parsed: ValueRangeResponse =
            serde_json::from_str(&body).map_err(|e| SheetsError::Parse(e.to_string()))?;

        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        debug!("Sheets UPDATE {} ({} rows)", range, rows.len());
        let request = self
            .client
            .put(self.values_url(range))
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: rows,
            });
        self.execute(request).await?;
        Ok(())
    }

    async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        debug!("Sheets APPEND {} ({} rows)", range, rows.len());
        let request = self
            .client
            .post(format!("{}:append", self.values_url(range)))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: rows,
            });
        self.execute(request).await?;
        Ok(())
    }
}
