//! External text-generation service
//!
//! The rest of the system consumes a single capability: generate text from
//! a prompt, or fail with a categorized error. The [`Generator`] trait is
//! the seam; [`AnthropicGenerator`] is the production client,
//! [`StubGenerator`] the scripted test double, and [`RetryPolicy`] the pure
//! backoff wrapper composable over either.

pub mod anthropic;
pub mod error;
pub mod retry;
pub mod stub;

pub use anthropic::{AnthropicConfig, AnthropicGenerator};
pub use error::GenerationError;
pub use retry::RetryPolicy;
pub use stub::StubGenerator;

use async_trait::async_trait;

/// Default model identifier for generation requests.
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Default output token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// One generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// User prompt
    pub prompt: String,
    /// Output size cap
    pub max_tokens: u32,
    /// Sampling temperature, when the caller wants one
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// Request with default model and token cap.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    /// With a specific model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With a token cap
    #[inline]
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// With a sampling temperature
    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Synchronous "text from prompt" capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the request, or fail with a categorized error.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
