use image::{DynamicImage, GrayImage};
use serde::Serialize;

/// Luma statistics of an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageStats {
    pub width: u32,
    pub height: u32,
    pub mean: f64,
    /// RMS contrast: population standard deviation of luma.
    pub std_dev: f64,
}

impl ImageStats {
    pub fn measure(img: &DynamicImage) -> Self {
        Self::measure_gray(&img.to_luma8())
    }

    pub fn measure_gray(gray: &GrayImage) -> Self {
        let n = u64::from(gray.width()) * u64::from(gray.height());
        if n == 0 {
            return Self {
                width: gray.width(),
                height: gray.height(),
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let (sum, sum_sq) = gray.pixels().fold((0u64, 0u64), |(s, sq), p| {
            let v = u64::from(p.0[0]);
            (s + v, sq + v * v)
        });
        let mean = sum as f64 / n as f64;
        let variance = (sum_sq as f64 / n as f64 - mean * mean).max(0.0);

        Self {
            width: gray.width(),
            height: gray.height(),
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// Relative change in contrast from `self` to `after`, in percent.
    /// `None` when the starting image is flat.
    pub fn contrast_change_percent(&self, after: &ImageStats) -> Option<f64> {
        (self.std_dev > f64::EPSILON)
            .then(|| (after.std_dev - self.std_dev) / self.std_dev * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn flat_image_has_zero_deviation() {
        let stats = ImageStats::measure_gray(&GrayImage::from_pixel(4, 4, Luma([90])));
        assert_eq!(stats.mean, 90.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.contrast_change_percent(&stats), None);
    }

    #[test]
    fn half_black_half_white() {
        let gray = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let stats = ImageStats::measure_gray(&gray);
        assert!((stats.mean - 127.5).abs() < 1e-9);
        assert!((stats.std_dev - 127.5).abs() < 1e-9);
    }

    #[test]
    fn contrast_change_is_relative() {
        let before = ImageStats { width: 1, height: 1, mean: 0.0, std_dev: 20.0 };
        let after = ImageStats { std_dev: 30.0, ..before };
        assert_eq!(before.contrast_change_percent(&after), Some(50.0));
    }
}
