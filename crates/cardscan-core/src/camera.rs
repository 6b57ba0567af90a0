//! Camera backed by an image file on disk.
//!
//! Stands in for a capture device on machines without one: every frame is the
//! current content of the file.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CardScanError, CardScanResult, ErrorCode};
use crate::traits::{Camera, CameraConstraints, CameraStream};
use crate::types::CapturedImage;

/// Opens streams that read frames from a fixed file path.
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> CardScanResult<Box<dyn CameraStream>> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(CardScanError::camera(format!(
                    "{} is not a file",
                    self.path.display()
                )))
            }
            Err(e) => {
                let code = match e.kind() {
                    std::io::ErrorKind::PermissionDenied => ErrorCode::CamPermissionDenied,
                    _ => ErrorCode::CamNoDevice,
                };
                return Err(CardScanError::CameraUnavailable {
                    message: format!("{}: {}", self.path.display(), e),
                    code,
                    source: Some(Box::new(e)),
                });
            }
        }

        debug!(path = %self.path.display(), facing = ?constraints.facing, "File camera opened");
        Ok(Box::new(FileStream {
            path: self.path.clone(),
            live: true,
        }))
    }
}

struct FileStream {
    path: PathBuf,
    live: bool,
}

#[async_trait]
impl CameraStream for FileStream {
    async fn capture_frame(&mut self) -> CardScanResult<CapturedImage> {
        if !self.live {
            return Err(CardScanError::frame("Stream already stopped"));
        }
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CardScanError::CameraUnavailable {
                message: format!("Failed to read frame: {}", e),
                code: ErrorCode::CamFrameFailed,
                source: Some(Box::new(e)),
            }
        })?;
        Ok(CapturedImage::from_bytes(bytes))
    }

    fn stop(&mut self) {
        self.live = false;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImageFormat;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let camera = FileCamera::new("/nonexistent/card.png");
        let err = camera
            .acquire(&CameraConstraints::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::CamNoDevice);
    }

    #[tokio::test]
    async fn test_frames_come_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46]).unwrap();

        let camera = FileCamera::new(file.path());
        let mut stream = camera
            .acquire(&CameraConstraints::default())
            .await
            .unwrap();
        let frame = stream.capture_frame().await.unwrap();
        assert_eq!(frame.format(), Some(ImageFormat::Jpeg));

        stream.stop();
        assert!(!stream.is_live());
        assert!(stream.capture_frame().await.is_err());
    }
}
