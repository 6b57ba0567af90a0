//! Image preparation before recognition.

use cardscan_core::CapturedImage;
use image::DynamicImage;

use crate::error::{OcrError, OcrResult};

/// Decode a captured still and convert it to 8-bit grayscale.
pub fn to_grayscale(captured: &CapturedImage) -> OcrResult<DynamicImage> {
    if captured.is_empty() {
        return Err(OcrError::Decode("Captured image is empty".to_string()));
    }

    let decoded =
        image::load_from_memory(captured.bytes()).map_err(|e| OcrError::Decode(e.to_string()))?;

    Ok(DynamicImage::ImageLuma8(decoded.to_luma8()))
}
