//! HTTP recognition backend
//!
//! Sends the image as base64-encoded PNG to a recognition service and reads
//! back the block/line/element hierarchy as JSON.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::DynamicImage;
use serde::Serialize;
use tracing::debug;

use super::{RecognitionError, RecognizedText, TextRecognizer};

/// Recognition client talking to a JSON service
#[derive(Debug, Clone)]
pub struct HttpRecognizer {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

impl HttpRecognizer {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, RecognitionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RecognitionError::client_init(format!("failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// Service base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn recognize_url(&self) -> String {
        format!("{}/recognize", self.base_url)
    }

    /// Encode image to base64 PNG
    fn encode_image(image: &DynamicImage) -> Result<String, RecognitionError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| RecognitionError::service(format!("failed to encode image: {}", e)))?;
        Ok(general_purpose::STANDARD.encode(&buffer))
    }

    fn decode_response(body: &str) -> Result<RecognizedText, RecognitionError> {
        serde_json::from_str(body)
            .map_err(|e| RecognitionError::service(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl TextRecognizer for HttpRecognizer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn process(&self, image: &DynamicImage) -> Result<RecognizedText, RecognitionError> {
        let image_base64 = Self::encode_image(image)?;
        let url = self.recognize_url();
        debug!("Submitting {}x{} image to {}", image.width(), image.height(), url);

        let response = self
            .client
            .post(&url)
            .json(&ImageRequest { image_base64 })
            .send()
            .await
            .map_err(|e| RecognitionError::service(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecognitionError::service(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(RecognitionError::service(format!("{}: {}", status, body.trim())));
        }

        Self::decode_response(&body)
    }
}
