//! Puzzle images and blurring.
//!
//! Images are obtained through an [`ImageSource`] and degraded by a
//! [`BlurProvider`] before being shown. Both are seams: the game
//! controller only depends on the traits.

mod blur;
mod source;

pub use blur::{BlurProvider, GaussianBlur};
pub use source::{DirectorySource, ImageSource, SourceError, SyntheticSource};

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encodes an image as PNG bytes for an external renderer.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
