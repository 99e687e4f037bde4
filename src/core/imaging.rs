//! Image decoding for attached resources

use crate::error::Result;
use image::DynamicImage;

/// Decode an image, guessing the format from its magic bytes
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}
