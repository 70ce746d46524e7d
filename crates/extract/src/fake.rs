//! Deterministic model for tests and local runs without an API key.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ExtractError, GenerativeModel, Part};

/// A [`GenerativeModel`] that returns a canned reply and records its calls.
#[derive(Debug)]
pub struct FakeModel {
    reply: Result<String, ExtractError>,
    calls: AtomicUsize,
    last_parts: Mutex<Option<Vec<Part>>>,
}

impl FakeModel {
    /// Always answer with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_result(Ok(reply.into()))
    }

    /// Always fail with `error`.
    pub fn failing(error: ExtractError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(reply: Result<String, ExtractError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_parts: Mutex::new(None),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parts passed to the most recent `generate` call.
    pub fn last_parts(&self) -> Option<Vec<Part>> {
        self.last_parts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, parts: &[Part]) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_parts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(parts.to_vec());
        self.reply.clone()
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls() {
        let model = FakeModel::replying("{}");
        assert_eq!(model.call_count(), 0);
        assert_eq!(model.last_parts(), None);

        let reply = model.generate(&[Part::text("hi")]).await.unwrap();
        assert_eq!(reply, "{}");
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.last_parts(), Some(vec![Part::text("hi")]));
    }

    #[tokio::test]
    async fn failing_model() {
        let model = FakeModel::failing(ExtractError::Request("boom".into()));
        let err = model.generate(&[]).await.unwrap_err();
        assert_eq!(err, ExtractError::Request("boom".into()));
        assert_eq!(model.call_count(), 1);
    }
}
