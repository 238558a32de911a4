//! Grayscale morphology with a 2x2 square structuring element.
//!
//! The element covers the pixel and its left/upper neighbors. Dilation uses
//! the reflected element so that opening and closing are true morphological
//! openings and closings (idempotent, anti-extensive / extensive). Pixels
//! outside the image are ignored.

use image::{GrayImage, Luma};

fn window<F>(gray: &GrayImage, offsets: [i64; 2], pick: F) -> GrayImage
where
    F: Fn(u8, u8) -> u8,
{
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let mut acc = gray.get_pixel(x, y).0[0];
        for dy in offsets {
            for dx in offsets {
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx >= 0 && ny >= 0 && nx < i64::from(w) && ny < i64::from(h) {
                    acc = pick(acc, gray.get_pixel(nx as u32, ny as u32).0[0]);
                }
            }
        }
        Luma([acc])
    })
}

pub fn erode(gray: &GrayImage) -> GrayImage {
    window(gray, [-1, 0], u8::min)
}

pub fn dilate(gray: &GrayImage) -> GrayImage {
    window(gray, [0, 1], u8::max)
}

/// Erosion then dilation: removes bright features thinner than two pixels.
pub fn open(gray: &GrayImage) -> GrayImage {
    dilate(&erode(gray))
}

/// Dilation then erosion: fills dark holes thinner than two pixels.
pub fn close(gray: &GrayImage) -> GrayImage {
    erode(&dilate(gray))
}
