//! Factory for creating OCR engines from configuration.

use std::sync::Arc;

use cardscan_core::config::OcrConfig;
use cardscan_core::OcrEngine;
use tracing::info;

use crate::error::{OcrError, OcrResult};

#[cfg(feature = "tesseract")]
use crate::tesseract::TesseractOcr;

/// Engine names this crate knows about, compiled in or not.
pub const KNOWN_ENGINES: &[&str] = &["tesseract"];

/// Factory for creating OCR engines.
pub struct OcrFactory;

impl OcrFactory {
    /// Build the engine named by `config.engine`.
    pub fn from_config(config: &OcrConfig) -> OcrResult<Arc<dyn OcrEngine>> {
        let engine = config.engine.trim().to_lowercase();
        let built = match engine.as_str() {
            "tesseract" => Self::tesseract(config)?,
            _ => return Err(OcrError::UnsupportedEngine(config.engine.clone())),
        };

        info!(engine = built.name(), languages = %config.languages.joined(), "OCR engine ready");
        Ok(built)
    }

    #[cfg(feature = "tesseract")]
    fn tesseract(config: &OcrConfig) -> OcrResult<Arc<dyn OcrEngine>> {
        Ok(Arc::new(TesseractOcr::from_config(config)))
    }

    #[cfg(not(feature = "tesseract"))]
    fn tesseract(_config: &OcrConfig) -> OcrResult<Arc<dyn OcrEngine>> {
        Err(OcrError::NotCompiled {
            engine: "tesseract".to_string(),
            feature: "tesseract",
        })
    }

    /// Engines compiled into this build.
    #[allow(clippy::vec_init_then_push)]
    pub fn available() -> Vec<&'static str> {
        let mut engines = Vec::new();

        #[cfg(feature = "tesseract")]
        engines.push("tesseract");

        engines
    }
}
