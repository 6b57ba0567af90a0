//! Core traits for cardscan providers.

mod camera;
mod card_store;
mod ocr;

pub use camera::*;
pub use card_store::*;
pub use ocr::*;
