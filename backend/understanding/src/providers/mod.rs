pub mod cloud_vision;
pub mod gemini;
pub mod tesseract;

pub use cloud_vision::CloudVisionRecognizer;
pub use gemini::{GeminiRecognizer, ModelInfo};
pub use tesseract::TesseractRecognizer;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wordbot_core::{RecognitionError, RecognitionRequest};

/// Axis-aligned box in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// One word as reported by a backend that segments its output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordDetail {
    pub text: String,
    /// Only present when the engine reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

/// Full text plus the words it was assembled from, taken from one engine
/// reply so the two always agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WordReport {
    #[serde(skip)]
    pub text: String,
    pub words: Vec<WordDetail>,
    /// Mean over the words that carry a confidence.
    pub mean_confidence: Option<f32>,
}

impl WordReport {
    pub fn new(text: impl Into<String>, words: Vec<WordDetail>) -> Self {
        let confidences: Vec<f32> = words.iter().filter_map(|w| w.confidence).collect();
        let mean_confidence = (!confidences.is_empty())
            .then(|| confidences.iter().sum::<f32>() / confidences.len() as f32);
        Self {
            text: text.into(),
            words,
            mean_confidence,
        }
    }
}

/// Backends that can list the individual words they found. One call yields
/// both the text and the words.
#[async_trait]
pub trait WordReporter: Send + Sync {
    async fn words(&self, request: &RecognitionRequest) -> Result<WordReport, RecognitionError>;
}

pub(crate) fn build_client(timeout: Option<Duration>) -> Client {
    let builder = Client::builder();
    let builder = match timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    };
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "HTTP client build failed; using defaults without a timeout");
        Client::new()
    })
}

/// Map a reqwest failure to a transport error without leaking the request URL.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> RecognitionError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("could not connect: {}", err.without_url())
    } else {
        err.without_url().to_string()
    };
    RecognitionError::transport(provider, message)
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleStatus,
}

/// `google.rpc.Status` as both Google APIs return it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GoogleStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

impl GoogleStatus {
    fn mentions_api_key(&self) -> bool {
        self.message.to_ascii_lowercase().contains("api key")
            || self.details.iter().any(|d| {
                d.get("reason")
                    .and_then(|r| r.as_str())
                    .is_some_and(|r| r.starts_with("API_KEY"))
            })
    }

    pub fn into_error(self, provider: &str, http_status: u16) -> RecognitionError {
        if matches!(http_status, 401 | 403) || self.mentions_api_key() {
            return RecognitionError::InvalidCredentials {
                provider: provider.to_string(),
                message: self.message,
            };
        }
        let message = if self.status.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, self.status)
        };
        RecognitionError::Api {
            provider: provider.to_string(),
            status: http_status,
            message,
        }
    }
}

/// Classify a non-2xx reply from a Google API.
pub(crate) fn error_from_status(provider: &str, status: StatusCode, body: &str) -> RecognitionError {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(parsed) => parsed.error.into_error(provider, status.as_u16()),
        Err(_) => {
            let status_only = GoogleStatus {
                message: body.trim().chars().take(300).collect(),
                ..Default::default()
            };
            status_only.into_error(provider, status.as_u16())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbot_core::FailureKind;

    #[test]
    fn invalid_key_body_is_a_credential_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#;
        let err = error_from_status("gemini", StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), FailureKind::Credentials);
        assert!(matches!(err, RecognitionError::InvalidCredentials { .. }));
    }

    #[test]
    fn forbidden_is_a_credential_error_even_without_body() {
        let err = error_from_status("vision", StatusCode::FORBIDDEN, "");
        assert_eq!(err.kind(), FailureKind::Credentials);
    }

    #[test]
    fn server_error_keeps_status() {
        let body = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        match error_from_status("gemini", StatusCode::SERVICE_UNAVAILABLE, body) {
            RecognitionError::Api { status, message, .. } => {
                assert_eq!(status, 503);
                assert_eq!(message, "The model is overloaded. (UNAVAILABLE)");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_truncated_into_message() {
        let body = "x".repeat(1000);
        match error_from_status("gemini", StatusCode::BAD_GATEWAY, &body) {
            RecognitionError::Api { message, .. } => assert_eq!(message.len(), 300),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn word_report_averages_only_reported_confidences() {
        let report = WordReport::new("a b c", vec![
            WordDetail { text: "a".into(), confidence: Some(80.0), bbox: None },
            WordDetail { text: "b".into(), confidence: None, bbox: None },
            WordDetail { text: "c".into(), confidence: Some(90.0), bbox: None },
        ]);
        assert_eq!(report.mean_confidence, Some(85.0));
        assert_eq!(WordReport::new("", vec![]).mean_confidence, None);
    }
}
