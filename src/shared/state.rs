//! Recognition result state shared between the orchestrator and the UI
//!
//! The store holds exactly one [`ResultRecord`] and publishes every
//! replacement through a `tokio::sync::watch` channel. The orchestrator is
//! the only writer of results; the UI resets and reads.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// The single piece of application state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// True when no recognition request is in flight
    pub processing_enabled: bool,
    /// Recognized words in document order (block, line, element)
    pub text_elements: Vec<String>,
    /// Per-element confidence rounded to 2 decimals, aligned with `text_elements`
    pub element_confidence: Vec<f64>,
    /// Aggregate confidence rounded to 2 decimals
    pub total_confidence: f64,
}

impl Default for ResultRecord {
    fn default() -> Self {
        Self::cleared(true)
    }
}

impl ResultRecord {
    /// Empty record with the given processing flag
    pub fn cleared(processing_enabled: bool) -> Self {
        Self {
            processing_enabled,
            text_elements: Vec::new(),
            element_confidence: Vec::new(),
            total_confidence: 0.0,
        }
    }

    /// Completed record carrying a single message instead of recognized
    /// words. Used for "no text" and failure results; processing is
    /// re-enabled so the user can retry.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            processing_enabled: true,
            text_elements: vec![message.into()],
            element_confidence: Vec::new(),
            total_confidence: 0.0,
        }
    }

    /// Whether no text (nor placeholder) is present
    pub fn is_empty(&self) -> bool {
        self.text_elements.is_empty()
    }
}

/// Owner of the current [`ResultRecord`]
///
/// Writes are thread-safe and atomic: the record is always replaced whole.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<ResultRecord>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store holding the default record
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ResultRecord::default());
        Self { tx }
    }

    /// Latest record. Never blocks on writers for longer than a clone.
    pub fn current(&self) -> ResultRecord {
        self.tx.borrow().clone()
    }

    /// Clear results and set the processing flag
    pub fn reset(&self, enabled: bool) {
        debug!("Resetting result state (processing_enabled={})", enabled);
        self.tx.send_replace(ResultRecord::cleared(enabled));
    }

    /// Atomically move from "enabled" to "processing".
    ///
    /// Returns false and leaves the record untouched when a request is
    /// already in flight. On success the record equals `reset(false)`.
    pub fn begin_processing(&self) -> bool {
        self.tx.send_if_modified(|record| {
            if record.processing_enabled {
                *record = ResultRecord::cleared(false);
                true
            } else {
                false
            }
        })
    }

    /// Replace the record unconditionally
    pub fn apply(&self, record: ResultRecord) {
        self.tx.send_replace(record);
    }

    /// Read-only handle that observes subsequent records
    pub fn subscribe(&self) -> StateObserver {
        StateObserver {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of a [`StateStore`]
#[derive(Debug, Clone)]
pub struct StateObserver {
    rx: watch::Receiver<ResultRecord>,
}

impl StateObserver {
    /// Latest record
    pub fn current(&self) -> ResultRecord {
        self.rx.borrow().clone()
    }

    /// Wait for the next replacement and return it.
    ///
    /// Intermediate values may be skipped; the returned record is never older
    /// than the last one written before this call resolved. Returns `None`
    /// once the store is gone.
    pub async fn changed(&mut self) -> Option<ResultRecord> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sample_record() -> ResultRecord {
        ResultRecord {
            processing_enabled: true,
            text_elements: vec!["Hello".to_string(), "World".to_string()],
            element_confidence: vec![0.9, 0.8],
            total_confidence: 0.72,
        }
    }

    #[test]
    fn test_default_record() {
        let store = StateStore::new();
        let record = store.current();

        assert!(record.processing_enabled);
        assert!(record.text_elements.is_empty());
        assert!(record.element_confidence.is_empty());
        assert_eq!(record.total_confidence, 0.0);
    }

    #[test]
    fn test_reset_clears_any_prior_state() {
        let store = StateStore::new();
        store.apply(sample_record());
        store.reset(false);
        store.reset(true);

        assert_eq!(store.current(), ResultRecord::cleared(true));
    }

    #[test]
    fn test_is_empty() {
        assert!(ResultRecord::cleared(true).is_empty());
        assert!(!ResultRecord::message("No text found in image").is_empty());
        assert!(!sample_record().is_empty());
    }

    #[test]
    fn test_reset_disabled() {
        let store = StateStore::new();
        store.apply(sample_record());
        store.reset(false);

        let record = store.current();
        assert!(!record.processing_enabled);
        assert!(record.is_empty());
    }

    #[test]
    fn test_apply_replaces_wholesale() {
        let store = StateStore::new();
        store.reset(false);
        store.apply(sample_record());

        assert_eq!(store.current(), sample_record());
    }

    #[test]
    fn test_begin_processing_only_once() {
        let store = StateStore::new();
        store.apply(sample_record());

        assert!(store.begin_processing());
        assert_eq!(store.current(), ResultRecord::cleared(false));

        // Second attempt while processing is rejected
        assert!(!store.begin_processing());
        assert_eq!(store.current(), ResultRecord::cleared(false));
    }

    #[test]
    fn test_message_record() {
        let record = ResultRecord::message("Recognition failed: boom");
        assert!(record.processing_enabled);
        assert_eq!(record.text_elements, vec!["Recognition failed: boom"]);
        assert!(record.element_confidence.is_empty());
        assert_eq!(record.total_confidence, 0.0);
    }

    #[tokio::test]
    async fn test_observer_sees_latest_value() {
        let store = Arc::new(StateStore::new());
        let mut observer = store.subscribe();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.reset(false);
                store.apply(sample_record());
            })
        };
        writer.await.unwrap();

        let seen = observer.changed().await.unwrap();
        assert_eq!(seen, sample_record());
        assert_eq!(observer.current(), sample_record());
    }

    #[tokio::test]
    async fn test_observer_ends_when_store_dropped() {
        let store = StateStore::new();
        let mut observer = store.subscribe();
        drop(store);

        assert!(observer.changed().await.is_none());
    }

    #[test]
    fn test_begin_processing_notifies_observers() {
        let store = StateStore::new();
        let observer = store.subscribe();
        store.begin_processing();

        assert!(!observer.current().processing_enabled);
    }
}
