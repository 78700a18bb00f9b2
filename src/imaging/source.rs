//! Image source abstraction.
//!
//! Resolves a puzzle identifier to a decoded image. The game never reads
//! files directly, so tests can substitute synthetic images.

use image::{DynamicImage, GrayImage, Luma};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a puzzle image.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("failed to decode image {id}: {reason}")]
    DecodeFailed { id: String, reason: String },
}

/// Trait for image source implementations.
pub trait ImageSource: Send + Sync {
    /// Loads the image with the given identifier.
    fn load(&self, image_id: &str) -> Result<DynamicImage, SourceError>;
}

/// Loads images from files in a directory, using the identifier as file name.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ImageSource for DirectorySource {
    fn load(&self, image_id: &str) -> Result<DynamicImage, SourceError> {
        let path = self.root.join(image_id);
        if !path.is_file() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }

        let image = image::open(&path).map_err(|e| SourceError::DecodeFailed {
            id: image_id.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(
            image = image_id,
            width = image.width(),
            height = image.height(),
            "Loaded puzzle image"
        );
        Ok(image)
    }
}

/// Generates deterministic grayscale images for testing and demos.
///
/// Each identifier yields its own checkerboard pattern, so blurring has a
/// visible effect without any files on disk.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::with_dimensions(64, 64)
    }

    /// Creates a source producing images of the given size.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for SyntheticSource {
    fn load(&self, image_id: &str) -> Result<DynamicImage, SourceError> {
        if image_id.is_empty() {
            return Err(SourceError::NotFound(String::new()));
        }

        // Cell size derived from the identifier so puzzles look different.
        let cell = 2 + image_id.bytes().map(u32::from).sum::<u32>() % 6;
        let pixels = GrayImage::from_fn(self.width, self.height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([230u8])
            } else {
                Luma([25u8])
            }
        });

        Ok(DynamicImage::ImageLuma8(pixels))
    }
}
