//! cardscan-ocr - OCR engines for cardscan.
//!
//! # Feature Flags
//!
//! - `image`: image decoding and grayscale preprocessing
//! - `tesseract`: Tesseract engine (requires the `tesseract` binary)
//!
//! # Example
//!
//! ```ignore
//! use cardscan_core::CardScanConfig;
//! use cardscan_ocr::OcrFactory;
//!
//! let config = CardScanConfig::load()?;
//! let ocr = OcrFactory::from_config(&config.ocr)?;
//! let text = ocr.recognize(&image, &config.ocr.languages, &progress).await?;
//! ```

pub mod error;
pub mod factory;

#[cfg(feature = "image")]
pub mod preprocess;

#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use error::{OcrError, OcrResult};
pub use factory::{OcrFactory, KNOWN_ENGINES};

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractOcr;
