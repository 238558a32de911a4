//! `wordbot enhance`

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use tracing::info;

use wordbot_enhance::{
    binarize, enhance, equalize_contrast, resize_to_height, EnhanceParams, ImageStats,
};

use crate::terminal_output::note_info;

/// What `wordbot enhance` does to the pixels after resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    /// Color enhancement, the same pass recognition runs first.
    Enhance,
    /// Grayscale plus CLAHE.
    Equalize,
    /// Black and white, as fed to Tesseract.
    Binarize,
}

pub async fn run(input: &Path, output: &Path, recipe: Recipe, height: Option<u32>) -> Result<()> {
    let source = wordbot_media::load_image(input)
        .await
        .with_context(|| format!("Cannot read image {}", input.display()))?;
    let pixels = wordbot_media::decode(&source).context("Cannot decode image")?;

    let processed = process(&pixels, recipe, height);
    let before = ImageStats::measure(&pixels);
    let after = ImageStats::measure(&processed);
    processed
        .save(output)
        .with_context(|| format!("Cannot write {}", output.display()))?;

    info!(input = %input.display(), output = %output.display(), "Wrote processed image");
    note_info(&format!(
        "{} -> {} ({}x{} -> {}x{}, luma std {:.1} -> {:.1})",
        input.display(),
        output.display(),
        before.width,
        before.height,
        after.width,
        after.height,
        before.std_dev,
        after.std_dev
    ));
    Ok(())
}

fn process(pixels: &DynamicImage, recipe: Recipe, height: Option<u32>) -> DynamicImage {
    let resized = match height {
        Some(h) => resize_to_height(pixels, h),
        None => pixels.clone(),
    };
    match recipe {
        Recipe::Enhance => enhance(&resized, &EnhanceParams::default()).0,
        Recipe::Equalize => DynamicImage::ImageLuma8(equalize_contrast(&resized.to_luma8())),
        Recipe::Binarize => DynamicImage::ImageLuma8(binarize(&resized)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(40, 10, |x, _| {
            if x % 5 == 0 { Rgb([20, 20, 20]) } else { Rgb([210, 210, 210]) }
        }))
    }

    #[test]
    fn binarized_output_is_gray_and_resized() {
        let out = process(&sample(), Recipe::Binarize, Some(20));
        assert_eq!((out.width(), out.height()), (80, 20));
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn enhanced_output_keeps_size() {
        let out = process(&sample(), Recipe::Enhance, None);
        assert_eq!((out.width(), out.height()), (40, 10));
    }

    #[test]
    fn equalized_output_is_gray_with_more_spread() {
        let faint = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 { Rgb([120, 120, 120]) } else { Rgb([136, 136, 136]) }
        }));
        let out = process(&faint, Recipe::Equalize, None);
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
        assert_eq!((out.width(), out.height()), (64, 64));
        let before = ImageStats::measure(&faint);
        let after = ImageStats::measure(&out);
        assert!(after.std_dev > before.std_dev);
    }

    #[tokio::test]
    async fn writes_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        sample().save(&input).unwrap();

        run(&input, &output, Recipe::Binarize, None).await.unwrap();
        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (40, 10));
    }

    #[tokio::test]
    async fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&dir.path().join("nope.png"), &dir.path().join("o.png"), Recipe::Enhance, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Cannot read image"));
    }
}
