//! Chat-completion transport.

use crate::config::ReportConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ReportError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Sends one chat conversation and returns the first answer's text.
pub trait ChatClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReportError>;
}

/// Blocking OpenAI-compatible client.
pub struct OpenAiClient {
    client: reqwest::blocking::Client,
    config: ReportConfig,
}

impl OpenAiClient {
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReportError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// Use a preconfigured HTTP client (proxy, TLS or timeout overrides).
    pub fn with_client(client: reqwest::blocking::Client, config: ReportConfig) -> Self {
        Self { client, config }
    }

    /// Pull `choices[0].message.content` out of a response body.
    fn parse_content(body: &str) -> Result<String, ReportError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| ReportError::InvalidResponse(format!("Failed to parse JSON: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ReportError::InvalidResponse("missing choices[0].message.content".to_string()))
    }
}

impl ChatClient for OpenAiClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ReportError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        debug!("POST {} (model {})", self.config.endpoint, self.config.model);
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| ReportError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| ReportError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ReportError::Network(format!("API error ({}): {}", status, text)));
        }

        Self::parse_content(&text)
    }
}
