use std::io::Cursor;
use std::path::Path;

use image::{ColorType, DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;
use wordbot_core::{ColorMode, ImageInput, RecognitionError, SourceFormat};

use crate::mime_detect::{detect_mime_type, sniff_format};

/// Refuse inputs beyond this size before attempting to decode.
const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image is empty")]
    Empty,

    #[error("image is {0} bytes, larger than the 32 MiB limit")]
    TooLarge(usize),

    #[error("unrecognized image format")]
    UnknownFormat,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid transport payload: {0}")]
    Transport(String),
}

impl From<MediaError> for RecognitionError {
    fn from(e: MediaError) -> Self {
        RecognitionError::Image(e.to_string())
    }
}

/// Read and validate an image file.
pub async fn load_image(path: &Path) -> Result<ImageInput, MediaError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let input = read_image(bytes)?;
    let by_extension = detect_mime_type(path);
    if by_extension != input.mime_type() && by_extension != "application/octet-stream" {
        debug!(
            path = %path.display(),
            extension = by_extension,
            content = input.mime_type(),
            "File extension does not match image content"
        );
    }
    debug!(path = %path.display(), image = %input.describe(), "Loaded image");
    Ok(input)
}

/// Validate encoded bytes and record their dimensions, color mode and format.
///
/// The bytes are kept unchanged so they can be sent as-is.
pub fn read_image(bytes: Vec<u8>) -> Result<ImageInput, MediaError> {
    if bytes.is_empty() {
        return Err(MediaError::Empty);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(MediaError::TooLarge(bytes.len()));
    }
    let format = sniff_format(&bytes);
    let fmt = image_format(format).ok_or(MediaError::UnknownFormat)?;
    let decoded = image::load_from_memory_with_format(&bytes, fmt)?;
    Ok(ImageInput {
        width: decoded.width(),
        height: decoded.height(),
        color: color_mode(decoded.color()),
        format,
        data: bytes,
    })
}

/// Decode an input back into pixels.
pub fn decode(input: &ImageInput) -> Result<DynamicImage, MediaError> {
    let decoded = match image_format(input.format) {
        Some(fmt) => image::load_from_memory_with_format(&input.data, fmt)?,
        None => image::load_from_memory(&input.data)?,
    };
    Ok(decoded)
}

/// Encode pixels as PNG and wrap them as an input.
pub fn from_dynamic(img: &DynamicImage) -> Result<ImageInput, MediaError> {
    // PNG has no float sample types.
    let owned;
    let img = match img.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            owned = DynamicImage::ImageRgba8(img.to_rgba8());
            &owned
        }
        _ => img,
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(ImageInput {
        data: buf.into_inner(),
        width: img.width(),
        height: img.height(),
        color: color_mode(img.color()),
        format: SourceFormat::Png,
    })
}

fn color_mode(color: ColorType) -> ColorMode {
    match color {
        ColorType::L8 | ColorType::L16 => ColorMode::Luma,
        ColorType::La8 | ColorType::La16 => ColorMode::LumaAlpha,
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => ColorMode::Rgb,
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => ColorMode::Rgba,
        _ => ColorMode::Other,
    }
}

fn image_format(format: SourceFormat) -> Option<ImageFormat> {
    match format {
        SourceFormat::Png => Some(ImageFormat::Png),
        SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
        SourceFormat::Bmp => Some(ImageFormat::Bmp),
        SourceFormat::Tiff => Some(ImageFormat::Tiff),
        SourceFormat::Gif => Some(ImageFormat::Gif),
        SourceFormat::WebP => Some(ImageFormat::WebP),
        SourceFormat::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, image::Rgb([200, 10, 10])));
        from_dynamic(&img).unwrap().data
    }

    #[test]
    fn reads_dimensions_and_mode() {
        let input = read_image(png_bytes(7, 3)).unwrap();
        assert_eq!((input.width, input.height), (7, 3));
        assert_eq!(input.color, ColorMode::Rgb);
        assert_eq!(input.format, SourceFormat::Png);
    }

    #[test]
    fn grayscale_reports_luma() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([9])));
        let input = from_dynamic(&img).unwrap();
        assert_eq!(input.color, ColorMode::Luma);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(read_image(Vec::new()), Err(MediaError::Empty)));
        assert!(matches!(
            read_image(b"definitely not pixels".to_vec()),
            Err(MediaError::UnknownFormat)
        ));
    }

    #[test]
    fn formats_outside_the_accepted_set_are_refused() {
        let ico = DynamicImage::ImageRgba8(image::RgbaImage::new(4, 4));
        let mut buf = Cursor::new(Vec::new());
        ico.write_to(&mut buf, ImageFormat::Ico).unwrap();
        assert!(matches!(
            read_image(buf.into_inner()),
            Err(MediaError::UnknownFormat)
        ));
    }

    #[test]
    fn bmp_keeps_its_source_format() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Bmp).unwrap();
        let input = read_image(buf.into_inner()).unwrap();
        assert_eq!(input.format, SourceFormat::Bmp);
        assert_eq!(input.mime_type(), "image/bmp");
    }

    #[test]
    fn decode_matches_source() {
        let input = read_image(png_bytes(5, 9)).unwrap();
        let pixels = decode(&input).unwrap();
        assert_eq!((pixels.width(), pixels.height()), (5, 9));
    }

    #[test]
    fn media_error_becomes_image_failure() {
        let err: RecognitionError = MediaError::Empty.into();
        assert!(matches!(err, RecognitionError::Image(_)));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word.png");
        std::fs::write(&path, png_bytes(12, 4)).unwrap();
        let input = load_image(&path).await.unwrap();
        assert_eq!(input.describe(), "12x4 pixels, format PNG");
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let err = load_image(Path::new("/nonexistent/word.png")).await.unwrap_err();
        assert!(matches!(err, MediaError::Read { .. }));
    }
}
