//! Error types for cardscan operations.
//!
//! Every failure the capture workflow can run into is non-fatal. Each variant
//! carries a structured [`ErrorCode`] so callers can react programmatically and
//! a presentation layer can pick a message without parsing strings.

use thiserror::Error;

use crate::types::CardField;
use crate::workflow::WorkflowState;

/// Result type alias for cardscan operations.
pub type CardScanResult<T> = Result<T, CardScanError>;

/// Main error type for all cardscan operations.
#[derive(Error, Debug)]
pub enum CardScanError {
    /// Camera permission denied or no capture device.
    #[error("Camera unavailable: {message}")]
    CameraUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The OCR adapter could not produce text.
    #[error("OCR failed: {message}")]
    OcrFailed {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A required card field is missing or blank.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        missing: Vec<CardField>,
    },

    /// Backend or database failure.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested action is not allowed in the current workflow state.
    #[error("Action '{action}' is not allowed while {from}")]
    InvalidTransition {
        from: WorkflowState,
        action: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Camera (CAM_xxx)
    CamPermissionDenied,
    CamNoDevice,
    CamFrameFailed,

    // OCR (OCR_xxx)
    OcrEngineUnavailable,
    OcrDecodeFailed,
    OcrRecognitionFailed,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Storage (STO_xxx)
    StoConnectionFailed,
    StoOperationFailed,

    // Workflow (WF_xxx)
    WfInvalidTransition,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CamPermissionDenied => "CAM_001",
            ErrorCode::CamNoDevice => "CAM_002",
            ErrorCode::CamFrameFailed => "CAM_003",
            ErrorCode::OcrEngineUnavailable => "OCR_001",
            ErrorCode::OcrDecodeFailed => "OCR_002",
            ErrorCode::OcrRecognitionFailed => "OCR_003",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::StoConnectionFailed => "STO_001",
            ErrorCode::StoOperationFailed => "STO_002",
            ErrorCode::WfInvalidTransition => "WF_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl CardScanError {
    /// Create a camera error for a missing capture device.
    pub fn camera(message: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            message: message.into(),
            code: ErrorCode::CamNoDevice,
            source: None,
        }
    }

    /// Create a camera error for denied access.
    pub fn camera_denied(message: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            message: message.into(),
            code: ErrorCode::CamPermissionDenied,
            source: None,
        }
    }

    /// Create a camera error for a failed frame grab.
    pub fn frame(message: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            message: message.into(),
            code: ErrorCode::CamFrameFailed,
            source: None,
        }
    }

    /// Create an OCR recognition error.
    pub fn ocr(message: impl Into<String>) -> Self {
        Self::OcrFailed {
            message: message.into(),
            code: ErrorCode::OcrRecognitionFailed,
            source: None,
        }
    }

    /// Create an OCR error with an explicit code.
    pub fn ocr_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::OcrFailed {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            missing: Vec::new(),
        }
    }

    /// Create a validation error listing the missing fields.
    pub fn missing_fields(missing: Vec<CardField>) -> Self {
        let names: Vec<&str> = missing.iter().map(|f| f.wire_name()).collect();
        Self::Validation {
            message: format!("All fields are required (missing: {})", names.join(", ")),
            code: ErrorCode::ValMissingField,
            missing,
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            code: ErrorCode::StoOperationFailed,
            source: None,
        }
    }

    /// Create a storage connection error.
    pub fn storage_connection(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
            code: ErrorCode::StoConnectionFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CameraUnavailable { code, .. } => *code,
            Self::OcrFailed { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::StorageUnavailable { code, .. } => *code,
            Self::InvalidTransition { .. } => ErrorCode::WfInvalidTransition,
            _ => ErrorCode::Internal,
        }
    }

    /// Fields reported missing by a validation error.
    pub fn missing(&self) -> &[CardField] {
        match self {
            Self::Validation { missing, .. } => missing,
            _ => &[],
        }
    }

    /// Short human-readable reason, without the variant prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::CameraUnavailable { message, .. }
            | Self::OcrFailed { message, .. }
            | Self::Validation { message, .. }
            | Self::StorageUnavailable { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::CameraUnavailable { .. } => Some("Check camera permissions and try again"),
            Self::OcrFailed { .. } => Some("Fill in the form manually or retake the photo"),
            Self::Validation { .. } => Some("Please fill in every field"),
            Self::StorageUnavailable { .. } => Some("Check the server connection and submit again"),
            _ => None,
        }
    }

    /// Convert from HTTP status code (for client errors).
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 | 422 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                missing: Vec::new(),
            },
            500..=599 => Self::StorageUnavailable {
                message: body.to_string(),
                code: ErrorCode::StoOperationFailed,
                source: None,
            },
            _ => Self::Internal(format!("HTTP {}: {}", status, body)),
        }
    }
}

impl From<rusqlite::Error> for CardScanError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable {
            message: err.to_string(),
            code: ErrorCode::StoOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
