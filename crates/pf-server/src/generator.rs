//! Description generator: one portrait in, one vision-model description out.
//!
//! The upstream is any OpenAI-compatible chat-completions endpoint that
//! accepts `image_url` content parts. Each request is a single best-effort
//! call with no retry.

use crate::config::GeneratorConfig;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Message every generator failure is reported to callers with.
pub const GENERIC_FAILURE: &str = "Failed to generate description from image.";

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("GROQ_API_KEY is not set")]
    MissingApiKey,
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected upstream response: {0}")]
    Malformed(String),
}

impl GeneratorError {
    /// What the HTTP caller gets to see. Details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        GENERIC_FAILURE
    }
}

/// Turns an image into descriptive text.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn generate_description(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GeneratorError>;
}

// ─── Upstream wire format ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Encode image bytes as a `data:` URL.
pub fn data_url(mime_type: &str, image: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(image))
}

fn build_request<'a>(config: &'a GeneratorConfig, image_url: String) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: &config.prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image_url },
                },
            ],
        }],
        max_tokens: config.max_tokens,
    }
}

fn extract_description(body: &[u8]) -> Result<String, GeneratorError> {
    let completion: ChatCompletion =
        serde_json::from_slice(body).map_err(|e| GeneratorError::Malformed(e.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GeneratorError::Malformed("missing choices[0].message.content".into()))
}

// ─── Vision generator ────────────────────────────────────────────────────

/// Calls a hosted multimodal chat-completions API.
pub struct VisionGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

impl VisionGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[async_trait]
impl DescriptionGenerator for VisionGenerator {
    async fn generate_description(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, GeneratorError> {
        if !self.config.has_api_key() {
            log::error!("description requested but GROQ_API_KEY is not set");
            return Err(GeneratorError::MissingApiKey);
        }

        let payload = build_request(&self.config, data_url(mime_type, image));
        log::debug!(
            "calling {} with model {} ({} byte {} image)",
            self.config.api_url,
            self.config.model,
            image.len(),
            mime_type
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("Error calling vision API: {e}");
                GeneratorError::Request(e)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            log::error!("Error calling vision API: {e}");
            GeneratorError::Request(e)
        })?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            log::error!("Error calling vision API: {status} {body}");
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_description(&body).inspect_err(|e| log::error!("Error calling vision API: {e}"))
    }
}
