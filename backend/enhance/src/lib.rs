//! Local pre-pass applied to an image before it is sent for recognition.
//!
//! Two recipes are offered:
//! - [`enhance`]: contrast, brightness and sharpness boosts followed by CLAHE
//!   on luminance. Color is kept; intended for hosted vision models.
//! - [`binarize`]: adaptive Gaussian threshold plus morphological opening and
//!   closing. Intended for the local Tesseract engine.
//!
//! Every number reported by [`EnhanceReport`] is measured from pixels.

pub mod adjust;
pub mod clahe;
pub mod morphology;
pub mod pipeline;
pub mod stats;
pub mod threshold;

pub use clahe::{clahe, equalize_contrast, equalize_luminance};
pub use pipeline::{
    binarize, enhance, resize_to_height, EnhanceParams, EnhanceReport, DEFAULT_TARGET_HEIGHT,
};
pub use stats::ImageStats;
