use std::time::Instant;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use tracing::debug;

use crate::adjust::{brightness, contrast, sharpness};
use crate::clahe::{equalize_luminance, DEFAULT_GRID};
use crate::morphology::{close, open};
use crate::stats::ImageStats;
use crate::threshold::adaptive_threshold;

/// Target height used when normalizing word crops.
pub const DEFAULT_TARGET_HEIGHT: u32 = 64;

/// Block size and offset of the adaptive threshold used by [`binarize`].
pub const THRESHOLD_BLOCK: u32 = 11;
pub const THRESHOLD_C: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhanceParams {
    pub contrast: f32,
    pub brightness: f32,
    pub sharpness: f32,
    pub clahe_clip: f32,
    pub clahe_grid: u32,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            contrast: 1.8,
            brightness: 1.2,
            sharpness: 2.0,
            clahe_clip: 4.0,
            clahe_grid: DEFAULT_GRID,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhanceReport {
    pub before: ImageStats,
    pub after: ImageStats,
    /// `None` when the input was a flat image.
    pub contrast_change_percent: Option<f64>,
    pub steps: Vec<&'static str>,
    pub elapsed_ms: u64,
}

/// Contrast, brightness and sharpness boosts followed by CLAHE on luminance.
///
/// The result is RGB with the input's dimensions; alpha is dropped.
pub fn enhance(img: &DynamicImage, params: &EnhanceParams) -> (DynamicImage, EnhanceReport) {
    let started = Instant::now();
    let before = ImageStats::measure(img);

    let rgb = img.to_rgb8();
    let rgb = contrast(&rgb, params.contrast);
    let rgb = brightness(&rgb, params.brightness);
    let rgb = sharpness(&rgb, params.sharpness);
    let rgb = equalize_luminance(&rgb, params.clahe_clip, params.clahe_grid);
    let out = DynamicImage::ImageRgb8(rgb);

    let after = ImageStats::measure(&out);
    let report = EnhanceReport {
        before,
        after,
        contrast_change_percent: before.contrast_change_percent(&after),
        steps: vec!["contrast", "brightness", "sharpness", "clahe"],
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    debug!(
        width = before.width,
        height = before.height,
        std_before = before.std_dev,
        std_after = after.std_dev,
        "image enhanced"
    );
    (out, report)
}

/// Grayscale, adaptive Gaussian threshold, then opening and closing with a
/// 2x2 square. Every output pixel is 0 or 255.
pub fn binarize(img: &DynamicImage) -> GrayImage {
    let gray = img.to_luma8();
    let binary = adaptive_threshold(&gray, THRESHOLD_BLOCK, THRESHOLD_C);
    close(&open(&binary))
}

/// Scale to `height` pixels tall, keeping the aspect ratio. The width never
/// drops below one pixel.
pub fn resize_to_height(img: &DynamicImage, height: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if h == 0 || height == 0 || h == height {
        return img.clone();
    }
    let width = ((u64::from(w) * u64::from(height)) / u64::from(h)).max(1) as u32;
    img.resize_exact(width, height, FilterType::Triangle)
}
