//! Vision model configuration.

use serde::{Deserialize, Serialize};

use super::prompts::DEFAULT_CARD_PROMPT;

/// Configuration for the vision model client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    /// OpenAI-compatible API base (the client appends `/v1/chat/completions`)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Vision-capable model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in the completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature; the provider default applies when unset
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Custom extraction prompt
    #[serde(default)]
    pub prompt: Option<String>,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
            prompt: None,
        }
    }
}

impl VisionConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `VISION_API_KEY` or `OPENAI_API_KEY`: API key (the former wins)
    /// - `VISION_ENDPOINT`: API base URL
    /// - `VISION_MODEL`: Model name
    /// - `VISION_MAX_TOKENS`: Maximum tokens in response
    /// - `VISION_TEMPERATURE`: Sampling temperature
    /// - `VISION_TIMEOUT_SECS`: Request timeout
    /// - `VISION_PROMPT`: Custom extraction prompt
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("VISION_API_KEY") {
            self.api_key = Some(key);
        } else if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("VISION_ENDPOINT") {
            self.endpoint = val;
        }
        if let Ok(val) = std::env::var("VISION_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("VISION_MAX_TOKENS") {
            if let Ok(n) = val.parse() {
                self.max_tokens = n;
            }
        }
        if let Ok(val) = std::env::var("VISION_TEMPERATURE") {
            if let Ok(t) = val.parse() {
                self.temperature = Some(t);
            }
        }
        if let Ok(val) = std::env::var("VISION_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("VISION_PROMPT") {
            self.prompt = Some(val);
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Get the extraction prompt, using custom or default.
    pub fn get_prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(DEFAULT_CARD_PROMPT)
    }

    /// Full chat-completions URL.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VisionConfig::default();
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.max_tokens, 500);
        assert!(config.get_prompt().contains("business_name"));
        assert!(config.get_prompt().contains("contact_number"));
    }

    #[test]
    fn test_completions_url() {
        let config = VisionConfig::default().with_endpoint("http://localhost:8080/");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_partial_toml() {
        let config: VisionConfig = toml::from_str("model = \"gpt-4o\"\nmax_tokens = 800").unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.endpoint, "https://api.openai.com");
        assert_eq!(config.timeout_secs, 60);
    }
}
