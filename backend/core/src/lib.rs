pub mod error;
pub mod traits;
pub mod types;

pub use error::{FailureKind, RecognitionError};
pub use traits::TextRecognizer;
pub use types::{
    ColorMode, ImageInput, Recognition, RecognitionMode, RecognitionRequest, SourceFormat,
    DEFAULT_OCR_PROMPT, ERROR_PREFIX, NO_TEXT_SENTINEL,
};
