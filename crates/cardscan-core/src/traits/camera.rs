//! Camera traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CardScanResult;
use crate::types::CapturedImage;

/// Which camera to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera on mobile devices.
    #[default]
    Environment,
    /// Front camera.
    User,
}

/// Acquisition constraints passed to a [`Camera`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// A capture device that can open live streams.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Open a stream. Fails with `CameraUnavailable` on permission or device errors.
    async fn acquire(&self, constraints: &CameraConstraints)
        -> CardScanResult<Box<dyn CameraStream>>;
}

/// A live stream held open until [`CameraStream::stop`] is called.
#[async_trait]
pub trait CameraStream: Send {
    /// Grab the current frame as an encoded still.
    async fn capture_frame(&mut self) -> CardScanResult<CapturedImage>;

    /// Stop all tracks. Must be idempotent.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}
