//! Workflow states.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Where the capture workflow currently is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No camera, no image.
    Idle,
    /// Live camera stream held.
    CameraActive,
    /// A still has been captured and the camera released.
    PreviewReady,
    /// Recognition in flight for the captured still.
    OcrRunning,
    /// Editable form shown, pre-filled or empty.
    FormReady,
}

impl WorkflowState {
    /// Whether a captured image may exist in this state.
    pub fn holds_image(&self) -> bool {
        matches!(
            self,
            WorkflowState::PreviewReady | WorkflowState::OcrRunning | WorkflowState::FormReady
        )
    }
}
