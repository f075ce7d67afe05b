//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::vision::{ConfidenceAggregation, NormalizeOptions, RecognizerBackend};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bundled image settings
    pub assets: AssetSettings,
    /// Recognition service settings
    pub recognition: RecognitionSettings,
    /// Display strings
    pub display: DisplaySettings,
}

impl AppConfig {
    /// Options for the result normalizer
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            aggregation: self.recognition.aggregation,
            no_text_message: self.display.no_text_message.clone(),
        }
    }
}

/// Bundled image settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory holding the bundled images
    pub dir: PathBuf,
    /// File names of the first, second and third image
    pub images: [String; 3],
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            images: [
                "allt.png".to_string(),
                "choklad.png".to_string(),
                "sned.png".to_string(),
            ],
        }
    }
}

/// Recognition-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Recognizer backend
    pub backend: RecognizerBackend,
    /// Base URL of the recognition service (http backend)
    pub endpoint: String,
    /// JSON result replayed for every image (fixture backend)
    pub fixture: Option<PathBuf>,
    /// Deadline for a single recognition in milliseconds, 0 disables it
    pub timeout_ms: u64,
    /// Scope of the total confidence product
    pub aggregation: ConfidenceAggregation,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            backend: RecognizerBackend::Http,
            endpoint: "http://127.0.0.1:8866".to_string(),
            fixture: None,
            timeout_ms: 30_000,
            aggregation: ConfidenceAggregation::WholeImage,
        }
    }
}

impl RecognitionSettings {
    /// Recognition deadline, if enabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

/// User-facing strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Application title
    pub title: String,
    /// Short description shown under the title
    pub description: String,
    /// Shown while there is no result
    pub empty_message: String,
    /// Placeholder element when the image contains no text
    pub no_text_message: String,
    /// Prefix of the element shown after a failed recognition
    pub failure_prefix: String,
    /// Label in front of the total confidence
    pub total_confidence_label: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            title: "Text Lens".to_string(),
            description: "Pick an image to recognize its text".to_string(),
            empty_message: "No image processed yet".to_string(),
            no_text_message: "No text found in image".to_string(),
            failure_prefix: "Recognition failed: ".to_string(),
            total_confidence_label: "Total confidence: ".to_string(),
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "textlens", "TextLens")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check asset defaults
        assert_eq!(config.assets.dir, PathBuf::from("assets"));
        assert_eq!(config.assets.images[1], "choklad.png");

        // Check recognition defaults
        assert_eq!(config.recognition.backend, RecognizerBackend::Http);
        assert_eq!(config.recognition.timeout_ms, 30_000);
        assert!(config.recognition.fixture.is_none());
        assert_eq!(config.recognition.aggregation, ConfidenceAggregation::WholeImage);

        // Check display defaults
        assert_eq!(config.display.no_text_message, "No text found in image");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.assets.images, parsed.assets.images);
        assert_eq!(config.recognition.endpoint, parsed.recognition.endpoint);
        assert_eq!(config.display.failure_prefix, parsed.display.failure_prefix);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str(
            r#"
            [recognition]
            aggregation = "last_block"
            timeout_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(parsed.recognition.aggregation, ConfidenceAggregation::LastBlock);
        assert!(parsed.recognition.timeout().is_none());
        assert_eq!(parsed.recognition.endpoint, "http://127.0.0.1:8866");
        assert_eq!(parsed.assets.images[0], "allt.png");
    }

    #[test]
    fn test_last_line_aggregation_parses() {
        let parsed: AppConfig = toml::from_str("[recognition]\naggregation = \"last_line\"\n").unwrap();
        assert_eq!(parsed.recognition.aggregation, ConfidenceAggregation::LastLine);
    }

    #[test]
    fn test_timeout() {
        let settings = RecognitionSettings {
            timeout_ms: 1500,
            ..Default::default()
        };
        assert_eq!(settings.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_normalize_options_follow_config() {
        let mut config = AppConfig::default();
        config.recognition.aggregation = ConfidenceAggregation::LastBlock;
        config.display.no_text_message = "Ingen text".to_string();

        let options = config.normalize_options();
        assert_eq!(options.aggregation, ConfidenceAggregation::LastBlock);
        assert_eq!(options.no_text_message, "Ingen text");
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.recognition.backend = RecognizerBackend::Fixture;
        config.recognition.fixture = Some(PathBuf::from("fixtures/allt.json"));

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.recognition.backend, RecognizerBackend::Fixture);
        assert_eq!(loaded.recognition.fixture, Some(PathBuf::from("fixtures/allt.json")));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
