//! Retry policy with per-error backoff
//!
//! The delays depend on the error class, not only the attempt number:
//! connectivity failures back off exponentially, rate limits back off
//! linearly with a larger base. Only errors whose
//! [`is_retryable`](GenerationError::is_retryable) holds are retried.

use crate::error::GenerationError;
use crate::{GenerationRequest, Generator};
use std::time::Duration;

/// Default attempt cap, counting the first try.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decides whether and how long to wait between generation attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    /// When false, delays collapse to zero. For tests.
    sleep: bool,
}

impl RetryPolicy {
    /// Policy with the default attempt cap and real delays.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            sleep: true,
        }
    }

    /// Policy with a custom attempt cap.
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Policy that never sleeps between attempts. For tests.
    #[inline]
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.sleep = false;
        self
    }

    /// Total attempts allowed, counting the first try.
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff before retrying after `error` on zero-based `attempt`, or
    /// `None` when the error should not be retried.
    #[must_use]
    pub fn delay_after(&self, error: &GenerationError, attempt: u32) -> Option<Duration> {
        let secs = match error {
            GenerationError::Connectivity(_) => 2u64.saturating_pow(attempt),
            GenerationError::RateLimited(_) => 5 * (u64::from(attempt) + 1),
            GenerationError::Api { .. } | GenerationError::InvalidResponse(_) => return None,
        };
        if !self.sleep {
            return Some(Duration::ZERO);
        }
        Some(Duration::from_secs(secs))
    }

    /// Run `generator` against `request`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last error once the attempt cap is exhausted, or the
    /// first non-retryable error immediately.
    pub async fn run(
        &self,
        generator: &dyn Generator,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let mut attempt = 0u32;
        loop {
            match generator.generate(request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    let next = attempt + 1;
                    let Some(delay) = self.delay_after(&e, attempt) else {
                        tracing::warn!(error = %e, "generation failed, not retryable");
                        return Err(e);
                    };
                    if next >= self.max_attempts {
                        tracing::warn!(error = %e, attempts = self.max_attempts, "generation failed, attempts exhausted");
                        return Err(e);
                    }
                    tracing::info!(error = %e, attempt = next, delay_secs = delay.as_secs(), "generation failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt = next;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
