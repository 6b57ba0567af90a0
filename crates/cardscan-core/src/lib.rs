//! cardscan-core - Core library for cardscan.
//!
//! This crate provides the types, traits, field extraction rules and the
//! capture workflow for registering health-insurance cards from a photo.
//!
//! # Example
//!
//! ```ignore
//! use cardscan_core::{CaptureWorkflow, FileCamera, InMemoryCardStore};
//!
//! let mut workflow = CaptureWorkflow::new(camera, ocr, store);
//!
//! workflow.start().await?;
//! workflow.capture().await?;
//! workflow.process().await?;
//! workflow.update_form(CardField::Insurer, "CPAM")?;
//! let record = workflow.submit().await?;
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod extraction;
pub mod store;
pub mod traits;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use camera::FileCamera;
pub use config::{CardScanConfig, StorageProvider};
pub use error::{CardScanError, CardScanResult, ErrorCode};
pub use events::{Notice, NoticeBus, NoticeSubscriber};
pub use extraction::{extract_fields, FieldExtractor};
pub use store::{InMemoryCardStore, SqliteCardStore};
pub use traits::{
    Camera, CameraConstraints, CameraStream, CardStore, FacingMode, OcrEngine, ProgressReporter,
};
pub use types::{
    CapturedImage, CardField, CardForm, CardRecord, ExtractedFields, ImageFormat, LanguageHints,
    NewCard, RecognizedText,
};
pub use workflow::{CaptureWorkflow, OcrResolution, WorkflowOptions, WorkflowState};
