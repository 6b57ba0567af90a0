//! Integration tests for engine selection from configuration.

use cardscan_core::{CardScanConfig, CardScanError};
use cardscan_ocr::{OcrError, OcrFactory};

#[test]
fn test_default_config_selects_tesseract() {
    let config = CardScanConfig::default();
    let result = OcrFactory::from_config(&config.ocr);

    if cfg!(feature = "tesseract") {
        assert_eq!(result.ok().unwrap().name(), "tesseract");
    } else {
        let err: CardScanError = result.err().unwrap().into();
        assert!(matches!(err, CardScanError::Configuration(_)));
    }
}

#[test]
fn test_unknown_engine_surfaces_as_configuration_error() {
    let mut config = CardScanConfig::default();
    config.ocr.engine = "easyocr".to_string();

    let err = OcrFactory::from_config(&config.ocr).err().unwrap();
    assert_eq!(err.to_string(), "Unsupported OCR engine: easyocr");

    let err: CardScanError = err.into();
    assert!(matches!(err, CardScanError::Configuration(_)));
}

#[test]
fn test_runtime_failure_keeps_source() {
    let err: CardScanError = OcrError::Recognition("exit status 1".to_string()).into();
    assert!(std::error::Error::source(&err).is_some());
}
