//! MIME type and format detection for input images.

use std::path::Path;

use image::ImageFormat;
use wordbot_core::SourceFormat;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        _              => "application/octet-stream",
    }
}

/// Identify the container format from the leading bytes.
pub fn sniff_format(bytes: &[u8]) -> SourceFormat {
    match image::guess_format(bytes) {
        Ok(fmt) => source_format(fmt),
        Err(_) => SourceFormat::Unknown,
    }
}

fn source_format(fmt: ImageFormat) -> SourceFormat {
    match fmt {
        ImageFormat::Png => SourceFormat::Png,
        ImageFormat::Jpeg => SourceFormat::Jpeg,
        ImageFormat::Bmp => SourceFormat::Bmp,
        ImageFormat::Tiff => SourceFormat::Tiff,
        ImageFormat::Gif => SourceFormat::Gif,
        ImageFormat::WebP => SourceFormat::WebP,
        _ => SourceFormat::Unknown,
    }
}
