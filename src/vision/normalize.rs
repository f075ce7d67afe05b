//! Flattening of hierarchical recognition output into a [`ResultRecord`]

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{RecognizedText, TextElement};
use crate::shared::ResultRecord;

/// Scope of the aggregate confidence product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceAggregation {
    /// Product of every element confidence in the image
    #[default]
    WholeImage,
    /// Product of the last block's element confidences, all of its lines
    /// included. Earlier blocks do not count.
    LastBlock,
    /// Product of the last line's element confidences only. A trailing line
    /// without elements yields 1.0.
    LastLine,
}

/// Normalizer settings
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// How the total confidence is aggregated
    pub aggregation: ConfidenceAggregation,
    /// Placeholder element used when the image has no text blocks
    pub no_text_message: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            aggregation: ConfidenceAggregation::default(),
            no_text_message: "No text found in image".to_string(),
        }
    }
}

/// Round to 2 decimals, halves away from zero
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Product of element confidences; 0.0 when there are no elements
fn confidence_product<'a>(elements: impl Iterator<Item = &'a TextElement>) -> f64 {
    let mut count = 0usize;
    let product = elements.fold(1.0_f64, |total, element| {
        count += 1;
        total * f64::from(element.confidence)
    });

    if count == 0 {
        0.0
    } else {
        product
    }
}

/// Convert recognition output into the flat record shown to the user.
///
/// The returned record always has processing enabled and
/// `text_elements.len() == element_confidence.len()` unless the image had no
/// blocks, in which case the placeholder message is the only element.
pub fn normalize(text: &RecognizedText, options: &NormalizeOptions) -> ResultRecord {
    if text.blocks.is_empty() {
        info!("{}", options.no_text_message);
        return ResultRecord::message(options.no_text_message.clone());
    }

    let (text_elements, element_confidence): (Vec<String>, Vec<f64>) = text
        .elements()
        .map(|element| {
            (
                element.text.clone(),
                round_confidence(f64::from(element.confidence)),
            )
        })
        .unzip();

    let total = match options.aggregation {
        ConfidenceAggregation::WholeImage => confidence_product(text.elements()),
        ConfidenceAggregation::LastBlock => text
            .blocks
            .last()
            .map(|block| confidence_product(block.elements()))
            .unwrap_or(0.0),
        ConfidenceAggregation::LastLine => text
            .blocks
            .iter()
            .flat_map(|block| block.lines.iter())
            .last()
            .map(|line| {
                line.elements
                    .iter()
                    .fold(1.0_f64, |total, element| total * f64::from(element.confidence))
            })
            .unwrap_or(0.0),
    };

    debug!(
        "Normalized {} blocks into {} elements ({:?})",
        text.blocks.len(),
        text_elements.len(),
        options.aggregation
    );

    ResultRecord {
        processing_enabled: true,
        text_elements,
        element_confidence,
        total_confidence: round_confidence(total),
    }
}
