//! Presentation notices raised by the capture workflow.

use serde::Serialize;

use crate::types::{CardField, CardRecord, ExtractedFields};

/// One-shot signal for the presentation layer.
///
/// The core only carries context (reasons, missing fields, the stored record);
/// wording and styling are up to the subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    CameraActivated,
    CameraUnavailable { reason: String },
    OcrStarted,
    /// Completion ratio in `[0, 1]`. May be dropped by slow subscribers.
    OcrProgress { ratio: f32 },
    OcrCompleted { fields: ExtractedFields },
    OcrFailed { reason: String },
    ValidationFailed {
        missing: Vec<CardField>,
        reason: String,
    },
    SubmitSucceeded { record: CardRecord },
    SubmitFailed { reason: String },
    Reset,
}

impl Notice {
    /// Whether this notice reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::CameraUnavailable { .. }
                | Notice::OcrFailed { .. }
                | Notice::ValidationFailed { .. }
                | Notice::SubmitFailed { .. }
        )
    }

    /// Stable snake_case name of the notice.
    pub fn name(&self) -> &'static str {
        match self {
            Notice::CameraActivated => "camera_activated",
            Notice::CameraUnavailable { .. } => "camera_unavailable",
            Notice::OcrStarted => "ocr_started",
            Notice::OcrProgress { .. } => "ocr_progress",
            Notice::OcrCompleted { .. } => "ocr_completed",
            Notice::OcrFailed { .. } => "ocr_failed",
            Notice::ValidationFailed { .. } => "validation_failed",
            Notice::SubmitSucceeded { .. } => "submit_succeeded",
            Notice::SubmitFailed { .. } => "submit_failed",
            Notice::Reset => "reset",
        }
    }
}
