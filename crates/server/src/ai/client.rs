//! Chat completion client for Groq's OpenAI-compatible API

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Completion provider failures. None of these reach the caller verbatim.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Sampling {
    /// Low randomness and short output for patient-facing answers
    pub const PATIENT_CHAT: Sampling = Sampling {
        temperature: 0.3,
        max_tokens: 500,
        top_p: 0.9,
    };

    /// Near-deterministic structured output
    pub const DISEASE_INFO: Sampling = Sampling {
        temperature: 0.2,
        max_tokens: 2048,
        top_p: 0.95,
    };
}

/// A single completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub sampling: Sampling,
}

/// Something that turns messages into generated text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Text of the first choice, if the provider returned any
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError>;
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

/// Client for the Groq chat completions API
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl GroqClient {
    /// Create a new client. `timeout` bounds each call end to end.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            url: API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<String>, ProviderError> {
        let body = ApiRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            top_p: request.sampling.top_p,
        };

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                detail = %truncate(&detail, 512),
                "Completion provider returned an error"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let parsed: ApiResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

/// Cut a string to at most `max` bytes on a char boundary
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
