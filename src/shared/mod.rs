//! Shared state between the recognition orchestrator and the UI
//!
//! This module provides the thread-safe, observable result state that the
//! orchestrator writes and the UI renders.

pub mod state;

pub use state::{ResultRecord, StateObserver, StateStore};
