//! Bundled image assets
//!
//! The application ships a fixed set of three images. A [`BundledImage`]
//! selects one of them and the [`AssetLibrary`] resolves and decodes it.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::config::AssetSettings;
use crate::vision::RecognitionError;

/// Selector for one of the bundled images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BundledImage {
    First,
    Second,
    Third,
}

impl BundledImage {
    /// All selectors in display order
    pub const ALL: [BundledImage; 3] = [BundledImage::First, BundledImage::Second, BundledImage::Third];

    /// Position in the asset list
    pub fn index(self) -> usize {
        match self {
            BundledImage::First => 0,
            BundledImage::Second => 1,
            BundledImage::Third => 2,
        }
    }

    /// Label of the trigger action for this image
    pub fn label(self) -> &'static str {
        match self {
            BundledImage::First => "First image",
            BundledImage::Second => "Second image",
            BundledImage::Third => "Third image",
        }
    }
}

impl fmt::Display for BundledImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BundledImage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "first" => Ok(BundledImage::First),
            "2" | "second" => Ok(BundledImage::Second),
            "3" | "third" => Ok(BundledImage::Third),
            other => Err(format!("unknown image '{}'", other)),
        }
    }
}

/// Resolves bundled images to files and decodes them
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    dir: PathBuf,
    files: [String; 3],
}

impl AssetLibrary {
    pub fn new(dir: impl Into<PathBuf>, files: [String; 3]) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn from_settings(settings: &AssetSettings) -> Self {
        Self::new(&settings.dir, settings.images.clone())
    }

    /// Asset directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of a bundled image
    pub fn path_for(&self, image: BundledImage) -> PathBuf {
        self.dir.join(&self.files[image.index()])
    }

    /// Read and decode an image (blocking)
    pub fn load(&self, image: BundledImage) -> Result<DynamicImage, RecognitionError> {
        let path = self.path_for(image);
        debug!("Loading {} from {:?}", image, path);

        image::open(&path).map_err(|e| RecognitionError::Asset {
            path,
            message: e.to_string(),
        })
    }

    /// Read and decode an image on the blocking thread pool
    pub async fn load_async(&self, image: BundledImage) -> Result<DynamicImage, RecognitionError> {
        let library = self.clone();
        tokio::task::spawn_blocking(move || library.load(image))
            .await
            .map_err(|e| RecognitionError::Asset {
                path: self.path_for(image),
                message: format!("image loading task failed: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files() -> [String; 3] {
        ["a.png".to_string(), "b.png".to_string(), "c.png".to_string()]
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("1".parse::<BundledImage>().unwrap(), BundledImage::First);
        assert_eq!("Second".parse::<BundledImage>().unwrap(), BundledImage::Second);
        assert_eq!(" third ".parse::<BundledImage>().unwrap(), BundledImage::Third);
        assert!("4".parse::<BundledImage>().is_err());
    }

    #[test]
    fn test_indices_follow_display_order() {
        for (i, image) in BundledImage::ALL.iter().enumerate() {
            assert_eq!(image.index(), i);
        }
    }

    #[test]
    fn test_path_for() {
        let library = AssetLibrary::new("/data/assets", files());
        assert_eq!(library.path_for(BundledImage::Second), PathBuf::from("/data/assets/b.png"));
    }

    #[test]
    fn test_load_decodes_image() {
        let dir = TempDir::new().unwrap();
        DynamicImage::new_rgb8(8, 5).save(dir.path().join("c.png")).unwrap();

        let library = AssetLibrary::new(dir.path(), files());
        let image = library.load(BundledImage::Third).unwrap();
        assert_eq!((image.width(), image.height()), (8, 5));
    }

    #[test]
    fn test_load_missing_asset() {
        let dir = TempDir::new().unwrap();
        let library = AssetLibrary::new(dir.path(), files());

        let err = library.load(BundledImage::First).unwrap_err();
        match err {
            RecognitionError::Asset { path, .. } => assert_eq!(path, dir.path().join("a.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_load_async() {
        let dir = TempDir::new().unwrap();
        DynamicImage::new_rgb8(2, 2).save(dir.path().join("a.png")).unwrap();

        let library = AssetLibrary::new(dir.path(), files());
        assert!(library.load_async(BundledImage::First).await.is_ok());
    }
}
