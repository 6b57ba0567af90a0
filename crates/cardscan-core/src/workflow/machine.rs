//! The capture-to-submit state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CardScanConfig;
use crate::error::{CardScanError, CardScanResult, ErrorCode};
use crate::events::{Notice, NoticeBus, NoticeSubscriber};
use crate::extraction::FieldExtractor;
use crate::traits::{Camera, CameraConstraints, CardStore, OcrEngine, ProgressReporter};
use crate::types::{
    CapturedImage, CardField, CardForm, CardRecord, ExtractedFields, LanguageHints,
    RecognizedText,
};
use crate::workflow::{StreamGuard, WorkflowState};

/// Tunables for a [`CaptureWorkflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowOptions {
    pub camera: CameraConstraints,
    pub languages: LanguageHints,
    /// Attach the captured photo to submissions as a data URL.
    pub attach_image: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            camera: CameraConstraints::default(),
            languages: LanguageHints::default(),
            attach_image: false,
        }
    }
}

/// Identifies one OCR run. Results carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OcrTicket(u64);

/// A recognition run detached from the workflow.
///
/// Obtained from [`CaptureWorkflow::begin_ocr`]. It owns everything it needs,
/// so it can be spawned while the workflow keeps handling `reset` or `retake`.
pub struct OcrJob {
    ticket: OcrTicket,
    image: CapturedImage,
    languages: LanguageHints,
    engine: Arc<dyn OcrEngine>,
    progress: ProgressReporter,
}

impl OcrJob {
    pub fn ticket(&self) -> OcrTicket {
        self.ticket
    }

    /// Run recognition once. No retry.
    pub async fn run(self) -> OcrOutcome {
        debug!(
            engine = self.engine.name(),
            bytes = self.image.len(),
            languages = %self.languages.joined(),
            "Running OCR"
        );
        let result = self
            .engine
            .recognize(&self.image, &self.languages, &self.progress)
            .await
            .map_err(into_ocr_failure);

        OcrOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of an [`OcrJob`], to be handed back to [`CaptureWorkflow::finish_ocr`].
#[derive(Debug)]
pub struct OcrOutcome {
    pub ticket: OcrTicket,
    pub result: CardScanResult<RecognizedText>,
}

/// What happened to an OCR outcome.
#[derive(Debug)]
pub enum OcrResolution {
    /// Text was recognized and the form pre-filled with whatever matched.
    Prefilled(ExtractedFields),
    /// Recognition failed. The form is shown empty.
    Failed(CardScanError),
    /// The workflow had moved on. Nothing changed.
    Discarded,
}

enum Session {
    Idle,
    CameraActive {
        stream: StreamGuard,
    },
    PreviewReady {
        image: CapturedImage,
    },
    OcrRunning {
        image: CapturedImage,
        ticket: OcrTicket,
    },
    FormReady {
        image: Option<CapturedImage>,
        form: CardForm,
    },
}

impl Session {
    fn state(&self) -> WorkflowState {
        match self {
            Session::Idle => WorkflowState::Idle,
            Session::CameraActive { .. } => WorkflowState::CameraActive,
            Session::PreviewReady { .. } => WorkflowState::PreviewReady,
            Session::OcrRunning { .. } => WorkflowState::OcrRunning,
            Session::FormReady { .. } => WorkflowState::FormReady,
        }
    }
}

/// Drives one card from camera to persisted record.
///
/// ```text
/// Idle -> CameraActive -> PreviewReady -> OcrRunning -> FormReady -> Idle
/// ```
///
/// Every failure is reported once on the notice bus and returned as an error;
/// none of them terminate the workflow. The camera stream lives inside the
/// `CameraActive` state, so leaving that state by any path releases it.
pub struct CaptureWorkflow {
    camera: Arc<dyn Camera>,
    ocr: Arc<dyn OcrEngine>,
    store: Arc<dyn CardStore>,
    extractor: FieldExtractor,
    notices: NoticeBus,
    options: WorkflowOptions,
    session: Session,
    next_ticket: u64,
    // Ticket of the run allowed to publish progress; 0 when none is.
    live_ticket: Arc<AtomicU64>,
}

impl CaptureWorkflow {
    pub fn new(
        camera: Arc<dyn Camera>,
        ocr: Arc<dyn OcrEngine>,
        store: Arc<dyn CardStore>,
    ) -> Self {
        Self {
            camera,
            ocr,
            store,
            extractor: FieldExtractor::new(),
            notices: NoticeBus::new(),
            options: WorkflowOptions::default(),
            session: Session::Idle,
            next_ticket: 0,
            live_ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Build a workflow from the `camera`, `ocr` and `workflow` sections.
    pub fn from_config(
        camera: Arc<dyn Camera>,
        ocr: Arc<dyn OcrEngine>,
        store: Arc<dyn CardStore>,
        config: &CardScanConfig,
    ) -> Self {
        Self::new(camera, ocr, store)
            .with_options(config.workflow_options())
            .with_notice_bus(NoticeBus::with_capacity(config.workflow.notice_capacity))
    }

    pub fn with_options(mut self, options: WorkflowOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_notice_bus(mut self, notices: NoticeBus) -> Self {
        self.notices = notices;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.session.state()
    }

    pub fn options(&self) -> &WorkflowOptions {
        &self.options
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    pub fn subscribe(&self) -> NoticeSubscriber {
        self.notices.subscribe()
    }

    /// The captured still, if the current state holds one.
    pub fn captured_image(&self) -> Option<&CapturedImage> {
        match &self.session {
            Session::PreviewReady { image } | Session::OcrRunning { image, .. } => Some(image),
            Session::FormReady { image, .. } => image.as_ref(),
            _ => None,
        }
    }

    /// The editable form, only in `FormReady`.
    pub fn form(&self) -> Option<&CardForm> {
        match &self.session {
            Session::FormReady { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn has_live_stream(&self) -> bool {
        matches!(&self.session, Session::CameraActive { stream } if stream.is_live())
    }

    /// Open the camera. From `CameraActive` this restarts the stream.
    pub async fn start(&mut self) -> CardScanResult<()> {
        let state = self.state();
        if !matches!(state, WorkflowState::Idle | WorkflowState::CameraActive) {
            return Err(invalid(state, "start"));
        }
        self.acquire_camera().await
    }

    /// Close the camera without capturing.
    pub fn cancel(&mut self) -> CardScanResult<()> {
        let state = self.state();
        if state != WorkflowState::CameraActive {
            return Err(invalid(state, "cancel"));
        }
        self.session = Session::Idle;
        debug!("Camera cancelled");
        Ok(())
    }

    /// Freeze the current frame and release the camera.
    pub async fn capture(&mut self) -> CardScanResult<()> {
        let state = self.state();
        let Session::CameraActive { stream } = &mut self.session else {
            return Err(invalid(state, "capture"));
        };

        let frame = match stream.capture_frame().await {
            Ok(image) if image.is_empty() => Err(CardScanError::frame("Camera returned an empty frame")),
            other => other,
        };

        // Either way the stream is dropped here.
        match frame {
            Ok(image) => {
                info!(bytes = image.len(), mime = image.mime_type(), "Frame captured");
                self.session = Session::PreviewReady { image };
                Ok(())
            }
            Err(err) => {
                self.session = Session::Idle;
                Err(self.camera_failure(err))
            }
        }
    }

    /// Discard the preview and reopen the camera.
    pub async fn retake(&mut self) -> CardScanResult<()> {
        let state = self.state();
        if state != WorkflowState::PreviewReady {
            return Err(invalid(state, "retake"));
        }
        self.acquire_camera().await
    }

    /// Start recognition of the captured still.
    ///
    /// The workflow moves to `OcrRunning` immediately. Hand the job's outcome
    /// back through [`finish_ocr`](Self::finish_ocr).
    pub fn begin_ocr(&mut self) -> CardScanResult<OcrJob> {
        let state = self.state();
        let image = match std::mem::replace(&mut self.session, Session::Idle) {
            Session::PreviewReady { image } => image,
            other => {
                self.session = other;
                return Err(invalid(state, "process"));
            }
        };

        self.next_ticket += 1;
        let ticket = OcrTicket(self.next_ticket);
        self.session = Session::OcrRunning {
            image: image.clone(),
            ticket,
        };
        self.live_ticket.store(ticket.0, Ordering::SeqCst);
        self.notices.emit(Notice::OcrStarted);

        let bus = self.notices.clone();
        let live = self.live_ticket.clone();
        let progress = ProgressReporter::new(move |ratio| {
            if live.load(Ordering::SeqCst) == ticket.0 {
                bus.emit(Notice::OcrProgress { ratio });
            }
        });

        Ok(OcrJob {
            ticket,
            image,
            languages: self.options.languages.clone(),
            engine: self.ocr.clone(),
            progress,
        })
    }

    /// Apply an OCR outcome if it still belongs to the current run.
    pub fn finish_ocr(&mut self, outcome: OcrOutcome) -> OcrResolution {
        let current = matches!(
            &self.session,
            Session::OcrRunning { ticket, .. } if *ticket == outcome.ticket
        );
        if !current {
            debug!(state = %self.state(), "Discarding stale OCR result");
            return OcrResolution::Discarded;
        }
        self.live_ticket.store(0, Ordering::SeqCst);

        let image = match std::mem::replace(&mut self.session, Session::Idle) {
            Session::OcrRunning { image, .. } => Some(image),
            _ => None,
        };

        match outcome.result {
            Ok(text) => {
                let fields = self.extractor.extract(text.as_str());
                info!(found = fields.found(), "OCR completed");
                self.session = Session::FormReady {
                    image,
                    form: CardForm::from(fields.clone()),
                };
                self.notices.emit(Notice::OcrCompleted {
                    fields: fields.clone(),
                });
                OcrResolution::Prefilled(fields)
            }
            Err(err) => {
                warn!(error = %err, "OCR failed, falling back to manual entry");
                self.session = Session::FormReady {
                    image,
                    form: CardForm::default(),
                };
                self.notices.emit(Notice::OcrFailed {
                    reason: err.reason(),
                });
                OcrResolution::Failed(err)
            }
        }
    }

    /// Run OCR on the captured still and wait for it.
    pub async fn process(&mut self) -> CardScanResult<OcrResolution> {
        let job = self.begin_ocr()?;
        let outcome = job.run().await;
        Ok(self.finish_ocr(outcome))
    }

    /// Edit one form field.
    pub fn update_form(&mut self, field: CardField, value: impl Into<String>) -> CardScanResult<()> {
        let state = self.state();
        match &mut self.session {
            Session::FormReady { form, .. } => {
                form.set(field, value);
                Ok(())
            }
            _ => Err(invalid(state, "update_form")),
        }
    }

    /// Validate the form and persist it.
    ///
    /// Incomplete forms never reach the store. On success the workflow returns
    /// to `Idle`. On any failure it stays in `FormReady` with the entered data.
    pub async fn submit(&mut self) -> CardScanResult<CardRecord> {
        let state = self.state();
        let (form, image) = match &self.session {
            Session::FormReady { form, image } => (form.clone(), image.clone()),
            _ => return Err(invalid(state, "submit")),
        };

        let mut card = match form.validate() {
            Ok(card) => card,
            Err(err) => {
                debug!(missing = ?err.missing(), "Submission rejected locally");
                self.report_submit_failure(&err);
                return Err(err);
            }
        };

        if self.options.attach_image {
            if let Some(image) = image {
                card = card.with_image_data(image.to_data_url());
            }
        }

        match self.store.create(card).await {
            Ok(record) => {
                info!(id = %record.id, "Card registered");
                self.session = Session::Idle;
                self.notices.emit(Notice::SubmitSucceeded {
                    record: record.clone(),
                });
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, "Card submission failed");
                self.report_submit_failure(&err);
                Err(err)
            }
        }
    }

    /// Return to `Idle` from anywhere, dropping the stream, image and form.
    pub fn reset(&mut self) {
        let from = self.state();
        self.session = Session::Idle;
        self.live_ticket.store(0, Ordering::SeqCst);
        debug!(%from, "Workflow reset");
        self.notices.emit(Notice::Reset);
    }

    async fn acquire_camera(&mut self) -> CardScanResult<()> {
        // Release whatever we hold before asking for a new stream.
        self.session = Session::Idle;

        match self.camera.acquire(&self.options.camera).await {
            Ok(stream) => {
                self.session = Session::CameraActive {
                    stream: StreamGuard::new(stream),
                };
                info!("Camera activated");
                self.notices.emit(Notice::CameraActivated);
                Ok(())
            }
            Err(err) => Err(self.camera_failure(err)),
        }
    }

    fn camera_failure(&self, err: CardScanError) -> CardScanError {
        let err = match err {
            err @ CardScanError::CameraUnavailable { .. } => err,
            other => CardScanError::CameraUnavailable {
                message: other.reason(),
                code: ErrorCode::CamNoDevice,
                source: Some(Box::new(other)),
            },
        };
        warn!(error = %err, "Camera unavailable");
        self.notices.emit(Notice::CameraUnavailable {
            reason: err.reason(),
        });
        err
    }

    fn report_submit_failure(&self, err: &CardScanError) {
        let notice = match err {
            CardScanError::Validation { missing, .. } => Notice::ValidationFailed {
                missing: missing.clone(),
                reason: err.reason(),
            },
            other => Notice::SubmitFailed {
                reason: other.reason(),
            },
        };
        self.notices.emit(notice);
    }
}

fn invalid(from: WorkflowState, action: &'static str) -> CardScanError {
    CardScanError::InvalidTransition { from, action }
}

fn into_ocr_failure(err: CardScanError) -> CardScanError {
    match err {
        err @ CardScanError::OcrFailed { .. } => err,
        other => CardScanError::OcrFailed {
            message: other.reason(),
            code: ErrorCode::OcrRecognitionFailed,
            source: Some(Box::new(other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{CameraStream, MockCardStore};
    use crate::types::NewCard;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StillCamera {
        stopped: Arc<AtomicBool>,
    }

    struct StillStream {
        stopped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Camera for StillCamera {
        async fn acquire(
            &self,
            _constraints: &CameraConstraints,
        ) -> CardScanResult<Box<dyn CameraStream>> {
            Ok(Box::new(StillStream {
                stopped: self.stopped.clone(),
            }))
        }
    }

    #[async_trait]
    impl CameraStream for StillStream {
        async fn capture_frame(&mut self) -> CardScanResult<CapturedImage> {
            Ok(CapturedImage::from_bytes(b"\x89PNG\r\n\x1a\nfake".to_vec()))
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            !self.stopped.load(Ordering::SeqCst)
        }
    }

    struct FixedOcr(&'static str);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize(
            &self,
            _image: &CapturedImage,
            _languages: &LanguageHints,
            progress: &ProgressReporter,
        ) -> CardScanResult<RecognizedText> {
            progress.report(1.0);
            Ok(RecognizedText::new(self.0))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn workflow(store: MockCardStore, text: &'static str) -> (CaptureWorkflow, Arc<AtomicBool>) {
        let stopped = Arc::new(AtomicBool::new(false));
        let camera = StillCamera {
            stopped: stopped.clone(),
        };
        let wf = CaptureWorkflow::new(Arc::new(camera), Arc::new(FixedOcr(text)), Arc::new(store));
        (wf, stopped)
    }

    async fn to_form(wf: &mut CaptureWorkflow) {
        wf.start().await.unwrap();
        wf.capture().await.unwrap();
        wf.process().await.unwrap();
        assert_eq!(wf.state(), WorkflowState::FormReady);
    }

    #[tokio::test]
    async fn test_whitespace_fields_never_reach_store() {
        let mut store = MockCardStore::new();
        store.expect_create().times(0);
        let (mut wf, _) = workflow(store, "DUPONT JEAN\n1234567890123\nCPAM");
        to_form(&mut wf).await;

        wf.update_form(CardField::Surname, "   ").unwrap();
        let err = wf.submit().await.unwrap_err();

        assert_eq!(err.missing(), &[CardField::Surname]);
        assert_eq!(wf.state(), WorkflowState::FormReady);
    }

    #[tokio::test]
    async fn test_submit_sends_trimmed_card() {
        let mut store = MockCardStore::new();
        store
            .expect_create()
            .withf(|card: &NewCard| card.surname == "DUPONT" && card.image_data.is_none())
            .times(1)
            .returning(|card| CardRecord::issue(card));
        let (mut wf, _) = workflow(store, "");
        to_form(&mut wf).await;

        wf.update_form(CardField::Surname, " DUPONT ").unwrap();
        wf.update_form(CardField::GivenName, "JEAN").unwrap();
        wf.update_form(CardField::PolicyNumber, "1234567890123").unwrap();
        wf.update_form(CardField::Insurer, "CPAM").unwrap();

        let record = wf.submit().await.unwrap();
        assert_eq!(record.surname, "DUPONT");
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert!(wf.form().is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_form() {
        let mut store = MockCardStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|_| Err(CardScanError::storage("database is locked")));
        let (mut wf, _) = workflow(store, "DUPONT JEAN\n1234567890123\nCPAM");
        to_form(&mut wf).await;
        wf.update_form(CardField::GivenName, "JEAN").unwrap();
        let mut sub = wf.subscribe();

        let err = wf.submit().await.unwrap_err();

        assert!(matches!(err, CardScanError::StorageUnavailable { .. }));
        assert_eq!(wf.state(), WorkflowState::FormReady);
        assert_eq!(wf.form().unwrap().get(CardField::GivenName), "JEAN");
        assert_eq!(
            sub.drain(),
            vec![Notice::SubmitFailed {
                reason: "database is locked".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_stale_ocr_outcome_is_discarded() {
        let (mut wf, _) = workflow(MockCardStore::new(), "DUPONT JEAN");
        wf.start().await.unwrap();
        wf.capture().await.unwrap();

        let job = wf.begin_ocr().unwrap();
        wf.reset();
        let outcome = job.run().await;

        assert!(matches!(wf.finish_ocr(outcome), OcrResolution::Discarded));
        assert_eq!(wf.state(), WorkflowState::Idle);
        assert!(wf.form().is_none());
    }

    #[tokio::test]
    async fn test_stream_released_on_capture_and_cancel() {
        let (mut wf, stopped) = workflow(MockCardStore::new(), "");
        wf.start().await.unwrap();
        assert!(wf.has_live_stream());
        wf.capture().await.unwrap();
        assert!(stopped.load(Ordering::SeqCst));
        assert!(!wf.has_live_stream());

        let (mut wf, stopped) = workflow(MockCardStore::new(), "");
        wf.start().await.unwrap();
        wf.cancel().unwrap();
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(wf.state(), WorkflowState::Idle);
    }
}
