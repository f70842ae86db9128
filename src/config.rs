//! Configuration management for cardscan.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables. The result is built once at startup and shared
//! read-only afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sheets::SheetsConfig;
use crate::vision::VisionConfig;

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cardscan.toml";

/// Default cap on a request body (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `CARDSCAN_HOST`: Bind host
    /// - `CARDSCAN_PORT`: Bind port
    /// - `CARDSCAN_MAX_UPLOAD_BYTES`: Request body limit
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CARDSCAN_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("CARDSCAN_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("CARDSCAN_MAX_UPLOAD_BYTES") {
            if let Ok(n) = val.parse() {
                self.max_upload_bytes = n;
            }
        }
        self
    }

    /// `host:port` string for display and binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text, without environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load settings from a specific TOML file.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut settings = Self::from_toml(&contents)?;
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Apply environment variable overrides to every section.
    pub fn with_env_overrides(self) -> Self {
        Self {
            vision: self.vision.with_env_overrides(),
            sheets: self.sheets.with_env_overrides(),
            server: self.server.with_env_overrides(),
            source_path: self.source_path,
        }
    }

    /// Check that the credentials the pipeline cannot run without are present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vision.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("OPENAI_API_KEY"));
        }
        self.validate_sheets()
    }

    /// Check only the spreadsheet credentials.
    pub fn validate_sheets(&self) -> Result<(), ConfigError> {
        if self.sheets.sheet_id.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("GOOGLE_SHEET_ID"));
        }
        let has_token = self.sheets.access_token.as_deref().is_some_and(|t| !t.is_empty());
        if !has_token && self.sheets.credentials_file.is_none() {
            return Err(ConfigError::Missing("GOOGLE_APPLICATION_CREDENTIALS"));
        }
        Ok(())
    }
}

/// Load settings for this process.
///
/// Priority for the file layer: an explicit path, then [`DEFAULT_CONFIG_FILE`]
/// in the working directory, then none. Environment variables always win.
pub async fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings = match config_path {
        Some(path) => Settings::load_from_path(path).await?,
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                tracing::debug!("Using config file {}", local.display());
                Settings::load_from_path(local).await?
            } else {
                Settings::default()
            }
        }
    };
    Ok(settings.with_env_overrides())
}
