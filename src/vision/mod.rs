//! Vision/OCR Layer
//!
//! Hierarchical text recognition results and the recognizer abstraction.
//! Supports multiple recognition backends:
//! - HTTP recognition service (JSON over HTTP)
//! - Fixture replay (a fixed result loaded from disk)

pub mod http;
pub mod normalize;
pub mod scripted;

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use http::HttpRecognizer;
pub use normalize::{normalize, round_confidence, ConfidenceAggregation, NormalizeOptions};
pub use scripted::ScriptedRecognizer;

/// Recognition backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerBackend {
    /// Remote recognition service
    #[default]
    Http,
    /// Replay a recognition result stored as JSON
    Fixture,
}

/// Smallest recognized unit, roughly a word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl TextElement {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A line of elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

/// Largest grouping of recognized text, roughly a paragraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Elements of every line in this block, in reading order
    pub fn elements(&self) -> impl Iterator<Item = &TextElement> {
        self.lines.iter().flat_map(|line| line.elements.iter())
    }
}

/// Complete recognition output for one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    pub fn new(blocks: Vec<TextBlock>) -> Self {
        Self { blocks }
    }

    /// Result with no blocks
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every element in document order (block, line, element)
    pub fn elements(&self) -> impl Iterator<Item = &TextElement> {
        self.blocks.iter().flat_map(TextBlock::elements)
    }
}

/// Errors on the recognition path
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("a recognition request is already in progress")]
    Busy,
    #[error("failed to load image '{}': {message}", path.display())]
    Asset { path: PathBuf, message: String },
    #[error("failed to configure text recognizer: {message}")]
    ClientInit { message: String },
    #[error("recognition service error: {message}")]
    Service { message: String },
    #[error("recognition timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
}

impl RecognitionError {
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    pub fn client_init(message: impl Into<String>) -> Self {
        Self::ClientInit {
            message: message.into(),
        }
    }
}

/// Common interface for all recognition backends.
///
/// `process` completes exactly once with either the hierarchical result or
/// an error.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(&self, image: &DynamicImage) -> Result<RecognizedText, RecognitionError>;
}
