//! Scripted generator for tests

use crate::error::GenerationError;
use crate::{GenerationRequest, Generator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A [`Generator`] that replays a fixed script of outcomes.
///
/// Each call consumes the next scripted result. When the script runs out,
/// the stub falls back to its repeating answer when one was set, otherwise
/// fails with [`GenerationError::InvalidResponse`]. Recorded prompts and
/// the call count are inspectable afterwards.
#[derive(Debug, Default)]
pub struct StubGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    repeat: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    /// Stub that answers every call with the same text.
    #[must_use]
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            repeat: Some(text.into()),
            ..Self::default()
        }
    }

    /// Stub that replays `outcomes` in order, then errors.
    #[must_use]
    pub fn script<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = Result<String, GenerationError>>,
    {
        let stub = Self::default();
        stub.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(outcomes);
        stub
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.prompt.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(outcome) => outcome,
            None => match &self.repeat {
                Some(text) => Ok(text.clone()),
                None => Err(GenerationError::InvalidResponse(
                    "stub script exhausted".into(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_repeats_the_same_answer() {
        let stub = StubGenerator::always("fixed");
        let req = GenerationRequest::new("anything");
        assert_eq!(stub.generate(&req).await.unwrap(), "fixed");
        assert_eq!(stub.generate(&req).await.unwrap(), "fixed");
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn script_replays_in_order_then_errors() {
        let stub = StubGenerator::script([
            Ok("one".to_string()),
            Err(GenerationError::RateLimited("busy".into())),
            Ok("two".to_string()),
        ]);
        let req = GenerationRequest::new("p");
        assert_eq!(stub.generate(&req).await.unwrap(), "one");
        assert!(matches!(
            stub.generate(&req).await,
            Err(GenerationError::RateLimited(_))
        ));
        assert_eq!(stub.generate(&req).await.unwrap(), "two");
        assert!(matches!(
            stub.generate(&req).await,
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn records_prompts() {
        let stub = StubGenerator::always("ok");
        stub.generate(&GenerationRequest::new("first"))
            .await
            .unwrap();
        stub.generate(&GenerationRequest::new("second"))
            .await
            .unwrap();
        assert_eq!(stub.prompts(), vec!["first", "second"]);
    }
}
