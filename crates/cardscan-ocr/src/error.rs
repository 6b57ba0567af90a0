//! OCR error types.

use cardscan_core::{CardScanError, ErrorCode};
use thiserror::Error;

/// Errors that can occur while setting up or running an OCR engine.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No engine with this name exists.
    #[error("Unsupported OCR engine: {0}")]
    UnsupportedEngine(String),

    /// The engine exists but this build does not include it.
    #[error("OCR engine '{engine}' requires the `{feature}` feature")]
    NotCompiled {
        engine: String,
        feature: &'static str,
    },

    /// The engine could not be reached at runtime (e.g. missing binary).
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The captured image could not be decoded.
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// The engine ran but failed.
    #[error("Recognition failed: {0}")]
    Recognition(String),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type for OCR operations.
pub type OcrResult<T> = Result<T, OcrError>;

impl From<OcrError> for CardScanError {
    fn from(err: OcrError) -> Self {
        let code = match &err {
            OcrError::UnsupportedEngine(_) | OcrError::NotCompiled { .. } => {
                return CardScanError::Configuration(err.to_string());
            }
            OcrError::EngineUnavailable(_) => ErrorCode::OcrEngineUnavailable,
            OcrError::Decode(_) => ErrorCode::OcrDecodeFailed,
            OcrError::Recognition(_) | OcrError::TaskJoin(_) => ErrorCode::OcrRecognitionFailed,
        };

        CardScanError::OcrFailed {
            message: err.to_string(),
            code,
            source: Some(Box::new(err)),
        }
    }
}
