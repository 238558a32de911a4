//! Base64 transport encoding for JSON request bodies.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use wordbot_core::{ImageInput, SourceFormat};

use crate::intake::{decode, from_dynamic, read_image, MediaError};

/// An image as it travels inside a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportImage {
    pub mime_type: String,
    /// Standard base64, no line breaks.
    pub data: String,
}

/// Encode the original bytes unchanged.
pub fn to_transport(input: &ImageInput) -> TransportImage {
    TransportImage {
        mime_type: input.mime_type().to_string(),
        data: STANDARD.encode(&input.data),
    }
}

/// Encode as PNG, re-encoding when the source is another format.
pub fn to_png_transport(input: &ImageInput) -> Result<TransportImage, MediaError> {
    if input.format == SourceFormat::Png {
        return Ok(to_transport(input));
    }
    let pixels: DynamicImage = decode(input)?;
    Ok(to_transport(&from_dynamic(&pixels)?))
}

/// Encode for APIs that take PNG, JPEG or WebP inline; other formats are
/// re-encoded as PNG.
pub fn to_inline_transport(input: &ImageInput) -> Result<TransportImage, MediaError> {
    match input.format {
        SourceFormat::Png | SourceFormat::Jpeg | SourceFormat::WebP => Ok(to_transport(input)),
        _ => to_png_transport(input),
    }
}

/// Decode a transport payload back into a validated input.
pub fn from_transport(payload: &TransportImage) -> Result<ImageInput, MediaError> {
    let bytes = STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| MediaError::Transport(e.to_string()))?;
    read_image(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn checkerboard(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        })
    }

    #[test]
    fn transport_preserves_dimensions() {
        for (w, h) in [(1, 1), (31, 7), (640, 3)] {
            let input = from_dynamic(&DynamicImage::ImageRgb8(checkerboard(w, h))).unwrap();
            let back = from_transport(&to_transport(&input)).unwrap();
            assert_eq!((back.width, back.height), (w, h));
            assert_eq!(back.data, input.data);
        }
    }

    #[test]
    fn bmp_is_reencoded_as_png() {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(9, 4, Rgba([1, 2, 3, 255])))
            .write_to(&mut buf, ImageFormat::Bmp)
            .unwrap();
        let input = read_image(buf.into_inner()).unwrap();
        assert_eq!(input.format, SourceFormat::Bmp);

        let payload = to_png_transport(&input).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        let back = from_transport(&payload).unwrap();
        assert_eq!(back.format, SourceFormat::Png);
        assert_eq!((back.width, back.height), (9, 4));
    }

    #[test]
    fn inline_transport_keeps_accepted_formats_only() {
        let jpeg = {
            let mut buf = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(checkerboard(8, 8))
                .write_to(&mut buf, ImageFormat::Jpeg)
                .unwrap();
            read_image(buf.into_inner()).unwrap()
        };
        let payload = to_inline_transport(&jpeg).unwrap();
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload, to_transport(&jpeg));

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(checkerboard(6, 5))
            .write_to(&mut buf, ImageFormat::Gif)
            .unwrap();
        let gif = read_image(buf.into_inner()).unwrap();
        assert_eq!(gif.format, SourceFormat::Gif);
        let payload = to_inline_transport(&gif).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(from_transport(&payload).unwrap().width, 6);
    }

    #[test]
    fn bad_base64_is_transport_error() {
        let payload = TransportImage {
            mime_type: "image/png".into(),
            data: "%%%".into(),
        };
        assert!(matches!(from_transport(&payload), Err(MediaError::Transport(_))));
    }

    #[test]
    fn serializes_camel_case() {
        let payload = TransportImage {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("mimeType"));
    }
}
