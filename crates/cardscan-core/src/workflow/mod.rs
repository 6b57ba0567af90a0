//! Capture workflow
//!
//! Camera -> still -> OCR -> editable form -> persisted record, as an
//! explicit state machine that reports every outcome on a notice bus.

mod guard;
mod machine;
mod state;

pub use guard::StreamGuard;
pub use machine::{
    CaptureWorkflow, OcrJob, OcrOutcome, OcrResolution, OcrTicket, WorkflowOptions,
};
pub use state::WorkflowState;
