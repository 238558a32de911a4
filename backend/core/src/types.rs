use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, RecognitionError};

/// Sentinel returned when the image holds nothing legible.
pub const NO_TEXT_SENTINEL: &str = "No text detected";

/// Prefix of every failure rendered as a string.
pub const ERROR_PREFIX: &str = "Error:";

/// Instruction sent to a vision model when the caller supplies none.
pub const DEFAULT_OCR_PROMPT: &str = "Look at this image and identify any text or words you can see. \
Return only the text/words you can read from the image. \
If there are multiple words, return them separated by spaces. \
If you cannot see any clear text, return \"No text detected\".";

/// Pixel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
    Other,
}

/// Container format the image arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Gif,
    WebP,
    Unknown,
}

impl SourceFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
            Self::Gif => "GIF",
            Self::WebP => "WEBP",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// An encoded image together with the facts read from its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Encoded file contents, exactly as they will be sent.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color: ColorMode,
    pub format: SourceFormat,
}

impl ImageInput {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn describe(&self) -> String {
        format!("{}x{} pixels, format {}", self.width, self.height, self.format)
    }
}

/// How much of the recognized text to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionMode {
    /// Only the first recognized word.
    SingleWord,
    #[default]
    MultipleWords,
}

impl RecognitionMode {
    /// Parse the `recognition.mode` config value: `single` or `multi`.
    pub fn from_config(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::SingleWord),
            "multi" => Some(Self::MultipleWords),
            _ => None,
        }
    }
}

/// One "read the text in this image" call.
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    pub image: ImageInput,
    pub prompt: String,
    pub mode: RecognitionMode,
}

impl RecognitionRequest {
    pub fn new(image: ImageInput) -> Self {
        Self {
            image,
            prompt: DEFAULT_OCR_PROMPT.to_string(),
            mode: RecognitionMode::default(),
        }
    }

    /// Use the caller's instruction; blank instructions keep the default prompt.
    pub fn with_prompt(mut self, prompt: Option<&str>) -> Self {
        if let Some(p) = prompt.map(str::trim).filter(|p| !p.is_empty()) {
            self.prompt = p.to_string();
        }
        self
    }

    pub fn with_mode(mut self, mode: RecognitionMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Outcome of a recognition call. Never an `Err`: failures are values.
#[derive(Debug)]
pub enum Recognition {
    Text(String),
    NoText,
    Failed(RecognitionError),
}

impl Recognition {
    /// Classify a model reply: blank or the model's own "no text" answer map to `NoText`.
    pub fn from_reply(reply: &str) -> Self {
        let trimmed = reply.trim();
        let bare = trimmed.trim_matches(|c: char| c == '"' || c == '.' || c == '\'');
        if trimmed.is_empty() || bare.eq_ignore_ascii_case(NO_TEXT_SENTINEL) {
            Self::NoText
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Render as the string a caller can branch on.
    pub fn to_sentinel(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.write_str(t),
            Self::NoText => f.write_str(NO_TEXT_SENTINEL),
            Self::Failed(e) => write!(f, "{ERROR_PREFIX} {e}"),
        }
    }
}

impl From<Result<String, RecognitionError>> for Recognition {
    fn from(result: Result<String, RecognitionError>) -> Self {
        match result {
            Ok(reply) => Self::from_reply(&reply),
            Err(e) => Self::Failed(e),
        }
    }
}
