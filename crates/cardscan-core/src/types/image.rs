//! Captured still frames.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// MIME type used when the encoding cannot be recognized.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Encoded image formats a camera frame may come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from magic bytes.
    pub fn detect(content: &[u8]) -> Option<Self> {
        if content.len() < 8 {
            return None;
        }

        if content.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(ImageFormat::Png)
        } else if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if content.starts_with(b"GIF87a") || content.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if content.starts_with(b"RIFF") && content.len() > 12 && &content[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

/// An immutable encoded still frame with its MIME type.
///
/// Cloning shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl CapturedImage {
    /// Wrap encoded bytes with an explicit MIME type.
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            mime_type: mime_type.into(),
        }
    }

    /// Wrap encoded bytes, sniffing the MIME type from their header.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let mime_type = ImageFormat::detect(&bytes)
            .map(|f| f.mime_type())
            .unwrap_or(OCTET_STREAM);
        Self::new(bytes, mime_type)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type).or_else(|| ImageFormat::detect(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Render as a `data:<mime>;base64,...` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_format_detection_png() {
        assert_eq!(ImageFormat::detect(&PNG_HEADER), Some(ImageFormat::Png));
    }

    #[test]
    fn test_format_detection_jpeg() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(ImageFormat::detect(&jpeg), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_format_detection_webp() {
        let mut webp = Vec::new();
        webp.extend_from_slice(b"RIFF");
        webp.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        webp.extend_from_slice(b"WEBP");
        webp.push(0x00);
        assert_eq!(ImageFormat::detect(&webp), Some(ImageFormat::Webp));
    }

    #[test]
    fn test_format_detection_too_short() {
        assert_eq!(ImageFormat::detect(&[0x89, 0x50]), None);
    }

    #[test]
    fn test_from_bytes_sniffs_mime() {
        let image = CapturedImage::from_bytes(PNG_HEADER.to_vec());
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.format(), Some(ImageFormat::Png));

        let unknown = CapturedImage::from_bytes(vec![0u8; 16]);
        assert_eq!(unknown.mime_type(), OCTET_STREAM);
        assert_eq!(unknown.format(), None);
    }

    #[test]
    fn test_data_url() {
        let image = CapturedImage::new(b"abc".to_vec(), "image/jpeg");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_clone_shares_bytes() {
        let image = CapturedImage::from_bytes(PNG_HEADER.to_vec());
        let copy = image.clone();
        assert_eq!(image, copy);
        assert_eq!(copy.len(), 8);
    }
}
