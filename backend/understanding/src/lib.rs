//! Reading text out of images.
//!
//! Backends (Gemini, Cloud Vision, local Tesseract) implement
//! [`TextRecognizer`](wordbot_core::TextRecognizer). [`Recognizer`] wraps one
//! and turns every outcome into a [`Recognition`](wordbot_core::Recognition);
//! [`VisionTextAgent`] runs the same call as a staged pipeline with a report.

pub mod agent;
pub mod postprocess;
pub mod providers;
pub mod recognizer;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use agent::{agent_info, AgentInfo, AgentReport, Stage, StageRecord, StageStatus, VisionTextAgent};
pub use postprocess::{clean_letters, normalize_whitespace, TextSummary};
pub use providers::tesseract::tesseract_version;
pub use providers::{
    BoundingBox, CloudVisionRecognizer, GeminiRecognizer, ModelInfo, TesseractRecognizer, WordDetail,
    WordReport, WordReporter,
};
pub use recognizer::{enhance_input, finalize, Recognizer};
