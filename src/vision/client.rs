//! OpenAI-compatible chat-completions client with image input.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::codec;
use super::{VisionConfig, VisionError, VisionModel};
use crate::models::UploadedImage;

/// Vision client for OpenAI, Groq, or any other chat-completions API that
/// accepts `image_url` content parts.
pub struct OpenAiVisionClient {
    config: VisionConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ChatContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiVisionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VisionError::Connection(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn build_request(&self, data_url: String) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ChatContent::Text {
                        text: self.config.get_prompt().to_string(),
                    },
                    ChatContent::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    fn classify_send_error(&self, e: reqwest::Error) -> VisionError {
        if e.is_timeout() {
            VisionError::Timeout(self.config.timeout_secs)
        } else {
            VisionError::Connection(e.to_string())
        }
    }
}

/// Pull the provider's error message out of a failed response body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn analyze(&self, image: &mut UploadedImage) -> Result<String, VisionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(VisionError::MissingApiKey)?;

        debug!("Encoding {} ({} bytes)", image.name(), image.size());
        let data_url = codec::data_url(image)?;
        let request = self.build_request(data_url);

        info!("Sending {} to {}", image.name(), self.config.model);
        let started = Instant::now();
        let resp = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.classify_send_error(e))?;
        if !status.is_success() {
            return Err(VisionError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| VisionError::Parse(e.to_string()))?;
        let choice = parsed.choices.into_iter().next().ok_or(VisionError::NoChoices)?;

        debug!(
            "Received completion for {} in {}ms",
            image.name(),
            started.elapsed().as_millis()
        );
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::io::Seek;

    fn client_for(url: &str) -> OpenAiVisionClient {
        OpenAiVisionClient::new(
            VisionConfig::default()
                .with_endpoint(url)
                .with_api_key("test-key"),
        )
        .unwrap()
    }

    fn card() -> UploadedImage {
        UploadedImage::new("card.jpg", Some("image/jpeg".into()), b"fake image".to_vec())
    }

    #[test]
    fn test_request_shape() {
        let client = client_for("http://localhost");
        let request = client.build_request("data:image/jpeg;base64,AAAA".to_string());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["max_tokens"], 500);
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#),
            "Incorrect API key provided"
        );
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(api_error_message(""), "empty response body");
    }

    #[tokio::test]
    async fn test_analyze_returns_content_verbatim() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::Regex("data:image/jpeg;base64,".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "```json\n{\"name\": \"Jane\"}\n```"}}]}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let mut image = card();
        let raw = client.analyze(&mut image).await.unwrap();

        mock.assert_async().await;
        assert_eq!(raw, "```json\n{\"name\": \"Jane\"}\n```");
        assert_eq!(image.reader_mut().stream_position().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_analyze_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "You exceeded your current quota"}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.analyze(&mut card()).await.unwrap_err();

        match err {
            VisionError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "You exceeded your current quota");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_no_choices() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.analyze(&mut card()).await.unwrap_err();
        assert!(matches!(err, VisionError::NoChoices));
    }

    #[tokio::test]
    async fn test_analyze_requires_key() {
        let client = OpenAiVisionClient::new(VisionConfig::default()).unwrap();
        let err = client.analyze(&mut card()).await.unwrap_err();
        assert!(matches!(err, VisionError::MissingApiKey));
    }
}
