//! Tesseract OCR engine.
//!
//! Shells out to the `tesseract` binary through rusty-tesseract, so the binary
//! and the requested language packs must be installed on the host.

use async_trait::async_trait;
use cardscan_core::config::OcrConfig;
use cardscan_core::{
    CapturedImage, CardScanError, CardScanResult, ErrorCode, LanguageHints, OcrEngine,
    ProgressReporter, RecognizedText,
};
use rusty_tesseract::{Args, Image, TessError};
use tracing::debug;

use crate::error::{OcrError, OcrResult};
use crate::preprocess;

/// Tesseract-backed [`OcrEngine`].
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    dpi: u32,
    psm: u8,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self::from_config(&OcrConfig::default())
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            dpi: config.dpi,
            psm: config.psm,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Page segmentation mode (`--psm`).
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = psm;
        self
    }

    fn args(&self, languages: &LanguageHints) -> Args {
        Args {
            lang: languages.joined(),
            dpi: Some(self.dpi as i32),
            psm: Some(self.psm as i32),
            ..Args::default()
        }
    }

    fn run_blocking(
        image: &CapturedImage,
        args: &Args,
        progress: &ProgressReporter,
    ) -> OcrResult<String> {
        let gray = preprocess::to_grayscale(image)?;
        progress.report(0.2);

        let input = Image::from_dynamic_image(&gray).map_err(|e| OcrError::Decode(e.to_string()))?;
        rusty_tesseract::image_to_string(&input, args).map_err(|e| match e {
            TessError::TesseractNotFoundError => OcrError::EngineUnavailable(e.to_string()),
            other => OcrError::Recognition(other.to_string()),
        })
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(
        &self,
        image: &CapturedImage,
        languages: &LanguageHints,
        progress: &ProgressReporter,
    ) -> CardScanResult<RecognizedText> {
        if languages.is_empty() {
            return Err(CardScanError::ocr_with_code(
                "No recognition language configured",
                ErrorCode::OcrEngineUnavailable,
            ));
        }

        progress.report(0.0);
        let args = self.args(languages);
        debug!(lang = %args.lang, dpi = self.dpi, psm = self.psm, "Starting Tesseract");

        let image = image.clone();
        let reporter = progress.clone();

        // Run Tesseract in blocking task to avoid blocking async runtime
        let text = tokio::task::spawn_blocking(move || Self::run_blocking(&image, &args, &reporter))
            .await
            .map_err(OcrError::from)??;

        progress.report(1.0);
        debug!(chars = text.len(), "Tesseract finished");
        Ok(RecognizedText::new(text))
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
