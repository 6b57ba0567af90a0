//! OCR engine trait and progress reporting.

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::CardScanResult;
use crate::types::{CapturedImage, LanguageHints, RecognizedText};

/// Core OCR trait - every recognition backend implements this.
///
/// One call per captured image, no retry. Failures surface as
/// [`CardScanError::OcrFailed`](crate::error::CardScanError::OcrFailed).
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Transcribe the image, reporting completion ratios along the way.
    async fn recognize(
        &self,
        image: &CapturedImage,
        languages: &LanguageHints,
        progress: &ProgressReporter,
    ) -> CardScanResult<RecognizedText>;

    /// Engine name for logs.
    fn name(&self) -> &str;
}

type ProgressSink = Arc<dyn Fn(f32) + Send + Sync>;

/// Forwards OCR completion ratios to an optional sink.
///
/// Values are clamped to `[0, 1]` and anything not strictly greater than the
/// last forwarded value is dropped, so the sink only ever sees a monotonically
/// increasing sequence.
#[derive(Clone, Default)]
pub struct ProgressReporter {
    sink: Option<ProgressSink>,
    last: Arc<Mutex<Option<f32>>>,
}

impl ProgressReporter {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        Self {
            sink: Some(Arc::new(sink)),
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// A reporter that discards everything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, ratio: f32) {
        if ratio.is_nan() {
            return;
        }
        let ratio = ratio.clamp(0.0, 1.0);

        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if matches!(*last, Some(prev) if ratio <= prev) {
            return;
        }
        *last = Some(ratio);
        drop(last);

        if let Some(sink) = &self.sink {
            sink(ratio);
        }
    }

    /// Last ratio forwarded, if any.
    pub fn last(&self) -> Option<f32> {
        self.last.lock().ok().and_then(|last| *last)
    }
}

impl fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_sink", &self.sink.is_some())
            .field("last", &self.last())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::new(move |p| sink.lock().unwrap().push(p));

        reporter.report(0.2);
        reporter.report(0.1);
        reporter.report(0.2);
        reporter.report(f32::NAN);
        reporter.report(0.6);
        reporter.report(4.0);
        reporter.report(1.0);

        assert_eq!(*seen.lock().unwrap(), vec![0.2, 0.6, 1.0]);
        assert_eq!(reporter.last(), Some(1.0));
    }

    #[test]
    fn test_silent_reporter_tracks_last() {
        let reporter = ProgressReporter::silent();
        assert_eq!(reporter.last(), None);
        reporter.report(-3.0);
        assert_eq!(reporter.last(), Some(0.0));
    }
}
