//! Generation error taxonomy

use thiserror::Error;

/// Errors from the text-generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Could not reach the service at all
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// Service accepted the connection but is shedding load
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Service returned a non-success status
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Response arrived but did not carry usable text
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether a retry with backoff could plausibly succeed.
    ///
    /// Connectivity failures and rate limits are transient; API rejections
    /// and malformed responses repeat on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_) | Self::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(GenerationError::Connectivity("refused".into()).is_retryable());
        assert!(GenerationError::RateLimited("429".into()).is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        let api = GenerationError::Api {
            status: 400,
            message: "bad request".into(),
        };
        assert!(!api.is_retryable());
        assert!(!GenerationError::InvalidResponse("no text".into()).is_retryable());
    }

    #[test]
    fn display_includes_status() {
        let api = GenerationError::Api {
            status: 500,
            message: "overloaded".into(),
        };
        assert_eq!(api.to_string(), "api error (status 500): overloaded");
    }
}
