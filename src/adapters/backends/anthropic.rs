//! Anthropic Messages API backend.
//!
//! Implements the `TextCompletion` port with direct HTTP calls to the
//! Messages API. The caller owns all degradation: any failure here is an
//! error the hypothesis generator converts into its rule-based path.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::BackendConfig;
use crate::domain::ports::TextCompletion;

pub struct AnthropicBackend {
    config: BackendConfig,
    api_key: String,
    client: Client,
}

impl AnthropicBackend {
    /// Build from config; the API key comes from the `ANTHROPIC_API_KEY`
    /// environment variable.
    pub fn new(config: BackendConfig) -> DomainResult<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| DomainError::BackendError("ANTHROPIC_API_KEY not set".to_string()))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: BackendConfig, api_key: impl Into<String>) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::BackendError(format!("failed to build client: {e}")))?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[async_trait]
impl TextCompletion for AnthropicBackend {
    async fn complete(&self, prompt: &str) -> DomainResult<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::BackendError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::BackendError(format!(
                "backend returned {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::BackendError(format!("malformed backend response: {e}")))?;

        parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .ok_or_else(|| DomainError::BackendError("backend returned no text content".to_string()))
    }
}
