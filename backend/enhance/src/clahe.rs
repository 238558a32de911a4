//! Contrast Limited Adaptive Histogram Equalization.
//!
//! The image is split into a grid of tiles; each tile gets its own clipped
//! histogram-equalization lookup table, and every pixel is mapped through a
//! bilinear blend of the four nearest tables.

use image::{GrayImage, Luma, RgbImage};

use crate::adjust::luma;

/// Default grid, 8x8 tiles.
pub const DEFAULT_GRID: u32 = 8;

struct TileGrid {
    cols: u32,
    rows: u32,
    tile_w: u32,
    tile_h: u32,
    luts: Vec<[u8; 256]>,
}

impl TileGrid {
    fn lut(&self, col: u32, row: u32) -> &[u8; 256] {
        &self.luts[(row * self.cols + col) as usize]
    }
}

/// Apply CLAHE with the given clip limit over a `grid` x `grid` tiling.
///
/// Images smaller than the grid get one tile per pixel along that axis.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }

    let tile_w = w.div_ceil(grid.clamp(1, w));
    let tile_h = h.div_ceil(grid.clamp(1, h));
    // Rounding the tile size up can leave trailing tiles empty; drop them.
    let cols = w.div_ceil(tile_w);
    let rows = h.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let x0 = col * tile_w;
            let y0 = row * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);
            luts.push(tile_lut(gray, x0, y0, x1, y1, clip_limit));
        }
    }
    let tiles = TileGrid { cols, rows, tile_w, tile_h, luts };

    let inv_tw = 1.0 / tiles.tile_w as f32;
    let inv_th = 1.0 / tiles.tile_h as f32;
    GrayImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y).0[0] as usize;

        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor();
        let ya = tyf - ty1;
        let (r1, r2) = neighbors(ty1 as i64, tiles.rows);

        let txf = x as f32 * inv_tw - 0.5;
        let tx1 = txf.floor();
        let xa = txf - tx1;
        let (c1, c2) = neighbors(tx1 as i64, tiles.cols);

        let top = f32::from(tiles.lut(c1, r1)[v]) * (1.0 - xa) + f32::from(tiles.lut(c2, r1)[v]) * xa;
        let bottom = f32::from(tiles.lut(c1, r2)[v]) * (1.0 - xa) + f32::from(tiles.lut(c2, r2)[v]) * xa;
        let out = top * (1.0 - ya) + bottom * ya;
        Luma([out.round().clamp(0.0, 255.0) as u8])
    })
}

/// Clamp a tile index and its right/lower neighbor into the grid.
fn neighbors(first: i64, count: u32) -> (u32, u32) {
    let last = i64::from(count) - 1;
    (first.clamp(0, last) as u32, (first + 1).clamp(0, last) as u32)
}

fn tile_lut(gray: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let area = (x1 - x0) * (y1 - y0);
    if area == 0 {
        let mut identity = [0u8; 256];
        for (i, v) in identity.iter_mut().enumerate() {
            *v = i as u8;
        }
        return identity;
    }

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut clipped = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                clipped += *bin - limit;
                *bin = limit;
            }
        }

        let batch = clipped / 256;
        let mut residual = clipped - batch * 256;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            for bin in hist.iter_mut().step_by(step) {
                if residual == 0 {
                    break;
                }
                *bin += 1;
                residual -= 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (i, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[i] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// CLAHE with clip 2.0 on an 8x8 grid, for grayscale OCR input.
pub fn equalize_contrast(gray: &GrayImage) -> GrayImage {
    clahe(gray, 2.0, DEFAULT_GRID)
}

/// Run CLAHE on luma and shift each RGB channel by the luma change.
pub fn equalize_luminance(img: &RgbImage, clip_limit: f32, grid: u32) -> RgbImage {
    let lum = GrayImage::from_fn(img.width(), img.height(), |x, y| Luma([luma(img.get_pixel(x, y))]));
    let equalized = clahe(&lum, clip_limit, grid);

    let mut out = img.clone();
    for (x, y, p) in out.enumerate_pixels_mut() {
        let delta = i16::from(equalized.get_pixel(x, y).0[0]) - i16::from(lum.get_pixel(x, y).0[0]);
        p.0 = p.0.map(|c| (i16::from(c) + delta).clamp(0, 255) as u8);
    }
    out
}
