//! HTTP client for the OpenAI-compatible chat, image and Assistants APIs.

use reqwest::{header, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::Role;

use crate::config::OpenAiConfig;

mod assistants;

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("AI service is not configured")]
    NotConfigured,

    #[error("AI service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service request timed out")]
    Timeout,

    #[error("AI service transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Unexpected AI service response: {0}")]
    Decode(String),

    #[error("No response generated by AI service")]
    EmptyResponse,

    #[error("Assistant run {status}: {message}")]
    RunFailed { status: String, message: String },

    #[error("Assistant run did not finish after {0} checks")]
    RunTimedOut(u32),
}

impl From<reqwest::Error> for OpenAiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OpenAiError::Timeout
        } else if err.is_decode() {
            OpenAiError::Decode(err.to_string())
        } else {
            OpenAiError::Transport(err)
        }
    }
}

/// Message in the wire shape of the chat completions API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Assistant reply from a non-streaming completion.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
    quality: &'static str,
    style: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn primary_key(&self) -> Result<&str, OpenAiError> {
        self.config.primary_key().ok_or(OpenAiError::NotConfigured)
    }

    /// Chat completions go to the Azure deployment when one is configured.
    fn chat_request(&self) -> Result<RequestBuilder, OpenAiError> {
        if let Some(azure) = &self.config.azure {
            let url = format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                azure.endpoint.trim_end_matches('/'),
                azure.deployment,
                azure.api_version
            );
            return Ok(self.http.post(url).header("api-key", &azure.api_key));
        }
        let key = self.primary_key()?;
        Ok(self.http.post(self.url("/chat/completions")).bearer_auth(key))
    }

    async fn check(resp: Response) -> Result<Response, OpenAiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("AI service error {}: {}", status, truncate(&body, 200));
        Err(OpenAiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn chat(&self, messages: &[WireMessage]) -> Result<Completion, OpenAiError> {
        let body = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: false,
        };

        let resp = self
            .chat_request()?
            .timeout(self.config.request_timeout())
            .json(&body)
            .send()
            .await?;
        let parsed: ChatCompletionResponse = Self::check(resp).await?.json().await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(OpenAiError::EmptyResponse)?;

        Ok(Completion {
            content,
            usage: parsed.usage,
        })
    }

    /// Start a streaming completion. The caller consumes the SSE body.
    pub async fn chat_stream(&self, messages: &[WireMessage]) -> Result<Response, OpenAiError> {
        let body = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream: true,
        };

        // Bound only the wait for response headers; the body may stream longer
        let send = self.chat_request()?.json(&body).send();
        let resp = tokio::time::timeout(self.config.request_timeout(), send)
            .await
            .map_err(|_| OpenAiError::Timeout)??;
        Self::check(resp).await
    }

    /// Generate one image and return it base64-encoded.
    pub async fn generate_image(&self, prompt: &str, size: &str) -> Result<String, OpenAiError> {
        let key = self.primary_key()?;
        let body = ImageRequest {
            model: &self.config.image_model,
            prompt,
            n: 1,
            size,
            quality: "standard",
            style: "natural",
            response_format: "b64_json",
        };

        let resp = self
            .http
            .post(self.url("/images/generations"))
            .bearer_auth(key)
            .timeout(self.config.image_timeout())
            .json(&body)
            .send()
            .await?;
        let parsed: ImageResponse = Self::check(resp).await?.json().await?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or(OpenAiError::EmptyResponse)
    }

    /// Connectivity probe: list models with the given key.
    pub async fn list_models(&self, key: &str) -> Result<(), OpenAiError> {
        let resp = self
            .http
            .get(self.url("/models"))
            .bearer_auth(key)
            .header(header::CONTENT_TYPE, "application/json")
            .timeout(self.config.request_timeout())
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}

/// First `max` characters of `text`, for log lines.
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
