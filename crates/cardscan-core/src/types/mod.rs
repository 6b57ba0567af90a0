//! Core data types.

mod card;
mod image;
mod text;

pub use card::*;
pub use image::*;
pub use text::*;
