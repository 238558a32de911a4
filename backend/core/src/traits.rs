use async_trait::async_trait;

use crate::error::RecognitionError;
use crate::types::RecognitionRequest;

/// A backend that can read text out of an image.
///
/// Implementations return the raw reply; turning it into a `Recognition`
/// (trimming, sentinels, single-word selection) happens one layer up.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Backend name used in logs and error messages (e.g. "gemini").
    fn name(&self) -> &str;

    /// Issue exactly one recognition call.
    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError>;
}
