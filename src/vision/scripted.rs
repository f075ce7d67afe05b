//! Deterministic recognizer that replays prepared outcomes
//!
//! Used for offline runs (a fixed result loaded from a JSON fixture) and for
//! exercising the orchestrator without a recognition service.

use async_trait::async_trait;
use image::DynamicImage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{RecognitionError, RecognizedText, TextRecognizer};

/// Recognizer returning queued outcomes, then a fallback result
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    outcomes: Mutex<VecDeque<Result<RecognizedText, String>>>,
    fallback: RecognizedText,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    /// Recognizer with an empty queue; every call yields an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognizer that answers every call with `result`
    pub fn repeating(result: RecognizedText) -> Self {
        Self {
            fallback: result,
            ..Self::default()
        }
    }

    /// Load a repeating result from a JSON fixture
    pub fn from_fixture(path: &Path) -> Result<Self, RecognitionError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecognitionError::client_init(format!("cannot read fixture {}: {}", path.display(), e))
        })?;
        let result: RecognizedText = serde_json::from_str(&content).map_err(|e| {
            RecognitionError::client_init(format!("invalid fixture {}: {}", path.display(), e))
        })?;

        debug!(
            "Loaded fixture {:?} with {} blocks",
            path,
            result.blocks.len()
        );
        Ok(Self::repeating(result))
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful outcome
    pub fn push_result(&self, result: RecognizedText) {
        self.outcomes.lock().push_back(Ok(result));
    }

    /// Queue a service failure
    pub fn push_failure(&self, message: impl Into<String>) {
        self.outcomes.lock().push_back(Err(message.into()));
    }

    /// Number of `process` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for ScriptedRecognizer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn process(&self, _image: &DynamicImage) -> Result<RecognizedText, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.outcomes.lock().pop_front();
        match next {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(RecognitionError::service(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}
