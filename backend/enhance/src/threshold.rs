//! Adaptive Gaussian thresholding.

use image::{GrayImage, Luma};

/// Gaussian kernel of odd `size`. With `sigma <= 0` the sigma is derived from
/// the size as `0.3 * ((size - 1) / 2 - 1) + 0.8`.
fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (size / 2) as i32;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Separable Gaussian blur with replicated borders, rounded back to `u8`.
pub fn gaussian_blur(gray: &GrayImage, size: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let kernel = gaussian_kernel(size, 0.0);
    let half = (kernel.len() / 2) as i64;
    let clamp_x = |x: i64| x.clamp(0, i64::from(w) - 1) as u32;
    let clamp_y = |y: i64| y.clamp(0, i64::from(h) - 1) as u32;

    let mut horizontal = vec![0f32; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let acc: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = clamp_x(i64::from(x) + k as i64 - half);
                    weight * f32::from(gray.get_pixel(sx, y).0[0])
                })
                .sum();
            horizontal[(y * w + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        let acc: f32 = kernel
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sy = clamp_y(i64::from(y) + k as i64 - half);
                weight * horizontal[(sy * w + x) as usize]
            })
            .sum();
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// A pixel becomes white when it is brighter than its Gaussian-weighted
/// neighborhood mean minus `c`, black otherwise.
///
/// `block_size` must be odd and at least 3.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    debug_assert!(block_size % 2 == 1 && block_size >= 3);
    let mean = gaussian_blur(gray, block_size);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = i32::from(gray.get_pixel(x, y).0[0]);
        let m = i32::from(mean.get_pixel(x, y).0[0]);
        Luma([if v - m > -c { 255 } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_sums_to_one_and_is_symmetric() {
        let k = gaussian_kernel(11, 0.0);
        assert_eq!(k.len(), 11);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((k[0] - k[10]).abs() < 1e-7);
        assert!(k[5] > k[4]);
    }

    #[test]
    fn flat_image_turns_white() {
        let gray = GrayImage::from_pixel(20, 20, Luma([60]));
        let out = adaptive_threshold(&gray, 11, 2);
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn dark_stroke_on_light_page_is_black() {
        let mut gray = GrayImage::from_pixel(30, 30, Luma([220]));
        for y in 5..25 {
            gray.put_pixel(15, y, Luma([20]));
        }
        let out = adaptive_threshold(&gray, 11, 2);
        assert_eq!(out.get_pixel(15, 15).0[0], 0);
        assert_eq!(out.get_pixel(2, 2).0[0], 255);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn blur_keeps_flat_values() {
        let gray = GrayImage::from_pixel(7, 3, Luma([133]));
        assert_eq!(gaussian_blur(&gray, 11), gray);
    }
}
