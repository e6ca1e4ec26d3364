//! Anthropic Messages API client
//!
//! A thin [`Generator`] over `POST /v1/messages`. Transport failures map to
//! [`GenerationError::Connectivity`], HTTP 429 to
//! [`GenerationError::RateLimited`], other non-success statuses to
//! [`GenerationError::Api`]. The first text block of the response is the
//! generated text.

use crate::error::GenerationError;
use crate::{GenerationRequest, Generator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Client configuration
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key sent in the `x-api-key` header
    pub api_key: String,
    /// Endpoint URL, overridable for tests
    pub api_url: String,
}

impl AnthropicConfig {
    /// Configuration with an explicit key and the production endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: API_URL.to_string(),
        }
    }

    /// Configuration from the `ANTHROPIC_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Fails with [`GenerationError::InvalidResponse`] when the variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, GenerationError> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(GenerationError::InvalidResponse(format!(
                "{API_KEY_ENV} is not set"
            ))),
        }
    }

    /// With a non-default endpoint. For tests.
    #[inline]
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Production [`Generator`] backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicGenerator {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicGenerator {
    #[must_use]
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::RateLimited(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidResponse("response carried no text block".into())
            })?;

        tracing::debug!(model = %request.model, chars = text.len(), "generation succeeded");
        Ok(text)
    }
}
