//! Text Lens - recognize text in bundled images
//!
//! Runs a text recognizer against one of three bundled images and publishes
//! the recognized words with per-word and total confidence as observable
//! state for the user interface.

pub mod app;
pub mod assets;
pub mod config;
pub mod shared;
pub mod ui;
pub mod vision;

pub use app::{RecognitionOrchestrator, RecognizerFactory};
pub use assets::{AssetLibrary, BundledImage};
pub use config::AppConfig;
pub use shared::{ResultRecord, StateObserver, StateStore};
pub use vision::{RecognitionError, RecognizedText, TextRecognizer};
