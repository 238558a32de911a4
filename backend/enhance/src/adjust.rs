//! Point and neighborhood adjustments on RGB images.
//!
//! Each adjustment blends the image with a "degenerate" version of itself:
//! `out = degenerate + factor * (img - degenerate)`. A factor of 1.0 is the
//! identity.

use image::{Rgb, RgbImage};

fn blend(degenerate: f32, value: u8, factor: f32) -> u8 {
    (degenerate + factor * (f32::from(value) - degenerate))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Integer luma with ITU-R 601 weights.
pub fn luma(p: &Rgb<u8>) -> u8 {
    let [r, g, b] = p.0;
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000) as u8
}

/// Blend toward a flat gray at the image's mean luma.
pub fn contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return img.clone();
    }
    let sum: u64 = img.pixels().map(|p| u64::from(luma(p))).sum();
    let mean = (sum as f64 / n as f64 + 0.5).floor() as f32;

    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0 = p.0.map(|c| blend(mean, c, factor));
    }
    out
}

/// Blend toward black.
pub fn brightness(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0 = p.0.map(|c| blend(0.0, c, factor));
    }
    out
}

/// Blend with a 3x3 smoothed copy (center weight 5, neighbors 1).
/// The one-pixel border is left as is.
pub fn sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut out = img.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                    let p = img.get_pixel(x + dx - 1, y + dy - 1);
                    for (a, c) in acc.iter_mut().zip(p.0) {
                        *a += weight * u32::from(c);
                    }
                }
            }
            let src = img.get_pixel(x, y).0;
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                let smooth = acc[c] as f32 / 13.0;
                px.0[c] = blend(smooth, src[c], factor);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone() -> RgbImage {
        RgbImage::from_fn(4, 1, |x, _| {
            if x < 2 { Rgb([100, 100, 100]) } else { Rgb([150, 150, 150]) }
        })
    }

    #[test]
    fn unit_factor_is_identity() {
        let img = two_tone();
        assert_eq!(contrast(&img, 1.0), img);
        assert_eq!(brightness(&img, 1.0), img);
        assert_eq!(sharpness(&img, 1.0), img);
    }

    #[test]
    fn contrast_spreads_around_mean() {
        let out = contrast(&two_tone(), 1.8);
        // mean luma 125: 125 + 1.8 * (100 - 125) = 80; 125 + 1.8 * 25 = 170
        assert_eq!(out.get_pixel(0, 0).0, [80, 80, 80]);
        assert_eq!(out.get_pixel(3, 0).0, [170, 170, 170]);
    }

    #[test]
    fn brightness_scales_and_saturates() {
        let img = RgbImage::from_pixel(1, 1, Rgb([100, 200, 250]));
        assert_eq!(brightness(&img, 1.2).get_pixel(0, 0).0, [120, 240, 255]);
    }

    #[test]
    fn sharpness_leaves_flat_regions() {
        let img = RgbImage::from_pixel(5, 5, Rgb([42, 42, 42]));
        assert_eq!(sharpness(&img, 2.0), img);
    }

    #[test]
    fn sharpness_amplifies_a_dot() {
        let mut img = RgbImage::from_pixel(3, 3, Rgb([100, 100, 100]));
        img.put_pixel(1, 1, Rgb([160, 160, 160]));
        let out = sharpness(&img, 2.0);
        // smooth = (8*100 + 5*160) / 13 ≈ 123.08; 123.08 + 2 * 36.92 ≈ 196.9
        assert_eq!(out.get_pixel(1, 1).0[0], 197);
        assert_eq!(out.get_pixel(0, 0).0[0], 100);
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(&Rgb([255, 255, 255])), 255);
        assert_eq!(luma(&Rgb([255, 0, 0])), 76);
    }
}
