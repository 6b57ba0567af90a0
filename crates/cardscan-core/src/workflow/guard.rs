//! Scoped ownership of a live camera stream.

use tracing::debug;

use crate::error::CardScanResult;
use crate::traits::CameraStream;
use crate::types::CapturedImage;

/// Owns a camera stream and stops it when dropped.
///
/// The workflow never holds a bare stream, so replacing or dropping the state
/// that contains the guard is enough to release the device on every path.
pub struct StreamGuard {
    stream: Box<dyn CameraStream>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream }
    }

    pub async fn capture_frame(&mut self) -> CardScanResult<CapturedImage> {
        self.stream.capture_frame().await
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_live()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("Camera stream released");
    }
}

impl std::fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGuard")
            .field("live", &self.is_live())
            .finish()
    }
}
