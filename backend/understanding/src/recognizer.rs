use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use uuid::Uuid;

use wordbot_core::{
    ImageInput, Recognition, RecognitionError, RecognitionMode, RecognitionRequest, TextRecognizer,
};
use wordbot_enhance::{EnhanceParams, EnhanceReport};
use wordbot_logging::{EventLogger, RecognitionEvent};

use crate::postprocess::select;
use crate::providers::{WordReport, WordReporter};

/// Turn a raw backend reply into an outcome for `mode`.
///
/// The "no text" check runs before word selection so a single-word request
/// never returns the first word of the sentinel.
pub fn finalize(reply: &str, mode: RecognitionMode) -> Recognition {
    match Recognition::from_reply(reply) {
        Recognition::Text(text) => {
            let selected = select(&text, mode);
            if selected.is_empty() {
                Recognition::NoText
            } else {
                Recognition::Text(selected)
            }
        }
        other => other,
    }
}

/// Run the enhancement pre-pass on the blocking pool and re-encode as PNG.
pub async fn enhance_input(
    input: &ImageInput,
    params: &EnhanceParams,
) -> Result<(ImageInput, EnhanceReport), RecognitionError> {
    let input = input.clone();
    let params = params.clone();
    tokio::task::spawn_blocking(move || -> Result<(ImageInput, EnhanceReport), RecognitionError> {
        let pixels = wordbot_media::decode(&input)?;
        let (enhanced, report) = wordbot_enhance::enhance(&pixels, &params);
        Ok((wordbot_media::from_dynamic(&enhanced)?, report))
    })
    .await
    .map_err(|e| RecognitionError::Image(format!("enhancement task failed: {e}")))?
}

/// Front door for recognition: every outcome, including failures, comes back
/// as a [`Recognition`] value.
pub struct Recognizer {
    backend: Arc<dyn TextRecognizer>,
    words: Option<Arc<dyn WordReporter>>,
    enhancement: Option<EnhanceParams>,
}

impl Recognizer {
    pub fn new(backend: Arc<dyn TextRecognizer>) -> Self {
        Self {
            backend,
            words: None,
            enhancement: None,
        }
    }

    /// Enhance images locally before they are sent.
    pub fn with_enhancement(mut self, params: Option<EnhanceParams>) -> Self {
        self.enhancement = params;
        self
    }

    /// Read through `reporter` instead, so one engine call yields both the
    /// text and the word list. It must wrap the same engine as the backend.
    pub fn with_word_reporter(mut self, reporter: Option<Arc<dyn WordReporter>>) -> Self {
        self.words = reporter;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn recognize(&self, request: &RecognitionRequest) -> Recognition {
        self.recognize_with_words(request).await.0
    }

    /// Like [`recognize`](Self::recognize), plus the word list when a word
    /// reporter is configured and the call succeeded.
    pub async fn recognize_with_words(
        &self,
        request: &RecognitionRequest,
    ) -> (Recognition, Option<WordReport>) {
        let run_id = Uuid::new_v4().to_string();
        let backend = self.backend.name().to_string();
        let started = Instant::now();
        EventLogger::log_event(
            &run_id,
            RecognitionEvent::Started {
                backend: backend.clone(),
                image: request.image.describe(),
            },
        );

        let prepared = self.prepare(request).await;
        let (result, words) = match &self.words {
            Some(reporter) => match reporter.words(&prepared).await {
                Ok(report) => (Ok(report.text.clone()), Some(report)),
                Err(e) => (Err(e), None),
            },
            None => (self.backend.recognize(&prepared).await, None),
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        let outcome = match result {
            Ok(reply) => finalize(&reply, request.mode),
            Err(e) => Recognition::Failed(e),
        };
        log_outcome(&run_id, backend, &outcome, latency_ms);
        (outcome, words)
    }

    /// The request to send: enhanced when configured, otherwise unchanged.
    async fn prepare(&self, request: &RecognitionRequest) -> RecognitionRequest {
        let Some(params) = &self.enhancement else {
            return request.clone();
        };
        match enhance_input(&request.image, params).await {
            Ok((image, report)) => {
                debug!(
                    contrast_change = ?report.contrast_change_percent,
                    "Enhanced image before recognition"
                );
                RecognitionRequest {
                    image,
                    ..request.clone()
                }
            }
            Err(e) => {
                warn!(error = %e, "Enhancement failed; sending the original image");
                request.clone()
            }
        }
    }
}

pub(crate) fn log_outcome(run_id: &str, backend: String, outcome: &Recognition, latency_ms: u64) {
    let event = match outcome {
        Recognition::Text(text) => RecognitionEvent::Completed {
            backend,
            outcome: "text".into(),
            chars: text.chars().count(),
            latency_ms,
        },
        Recognition::NoText => RecognitionEvent::Completed {
            backend,
            outcome: "no_text".into(),
            chars: 0,
            latency_ms,
        },
        Recognition::Failed(e) => {
            warn!(kind = ?e.kind(), "Recognition failed");
            RecognitionEvent::Failed {
                backend,
                error: e.to_string(),
                latency_ms,
            }
        }
    };
    EventLogger::log_event(run_id, event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{CloudVisionRecognizer, GeminiRecognizer};
    use crate::test_support::{sample_image, serve};
    use serde_json::json;
    use wordbot_core::{FailureKind, ERROR_PREFIX, NO_TEXT_SENTINEL};

    fn gemini(base_url: &str, key: Option<&str>) -> Recognizer {
        Recognizer::new(Arc::new(
            GeminiRecognizer::new(key.map(str::to_string)).with_base_url(base_url),
        ))
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
    }

    #[test]
    fn finalize_checks_sentinel_before_selecting() {
        assert!(matches!(
            finalize("No text detected.", RecognitionMode::SingleWord),
            Recognition::NoText
        ));
        assert_eq!(
            finalize(" EXIT now ", RecognitionMode::SingleWord).text(),
            Some("EXIT")
        );
        assert_eq!(
            finalize("\n EXIT now \n", RecognitionMode::MultipleWords).text(),
            Some("EXIT now")
        );
    }

    #[tokio::test]
    async fn valid_key_returns_trimmed_text() {
        let server = serve(200, reply("  STOP  \n")).await;
        let outcome = gemini(&server.base_url, Some("k"))
            .recognize(&RecognitionRequest::new(sample_image()))
            .await;
        let rendered = outcome.to_sentinel();
        assert_eq!(rendered, "STOP");
        assert!(!rendered.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn empty_reply_is_no_text() {
        let server = serve(200, reply("   ")).await;
        let outcome = gemini(&server.base_url, Some("k"))
            .recognize(&RecognitionRequest::new(sample_image()))
            .await;
        assert_eq!(outcome.to_sentinel(), NO_TEXT_SENTINEL);
    }

    #[tokio::test]
    async fn missing_key_is_a_credential_sentinel() {
        let server = serve(200, reply("unused")).await;
        let outcome = gemini(&server.base_url, None)
            .recognize(&RecognitionRequest::new(sample_image()))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Credentials));
        assert!(outcome.to_sentinel().starts_with(ERROR_PREFIX));
        assert!(server.hits().is_empty());
    }

    #[tokio::test]
    async fn invalid_key_is_a_credential_sentinel() {
        let body = json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.",
                                    "status": "INVALID_ARGUMENT", "details": [{"reason": "API_KEY_INVALID"}]}});
        let server = serve(400, body).await;
        let outcome = gemini(&server.base_url, Some("wrong"))
            .recognize(&RecognitionRequest::new(sample_image()))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Credentials));
        assert!(outcome.to_sentinel().starts_with("Error: gemini rejected the API key"));
    }

    #[tokio::test]
    async fn repeated_calls_are_independent() {
        let server = serve(200, reply("HELLO")).await;
        let recognizer = gemini(&server.base_url, Some("k"));
        let request = RecognitionRequest::new(sample_image());
        let first = recognizer.recognize(&request).await;
        let second = recognizer.recognize(&request).await;
        assert_eq!(first.text(), Some("HELLO"));
        assert_eq!(second.text(), Some("HELLO"));
        assert_eq!(server.hits().len(), 2);
    }

    #[tokio::test]
    async fn word_reporter_answers_with_one_call_on_the_enhanced_image() {
        let detection = json!({"responses": [{"textAnnotations": [
            {"description": "EXIT NOW\n"},
            {"description": "EXIT"},
            {"description": "NOW"}
        ]}]});
        let server = serve(200, detection).await;
        let vision = Arc::new(CloudVisionRecognizer::new(Some("k".into())).with_base_url(&server.base_url));
        let recognizer = Recognizer::new(vision.clone())
            .with_word_reporter(Some(vision))
            .with_enhancement(Some(EnhanceParams::default()));

        let image = sample_image();
        let (outcome, words) = recognizer
            .recognize_with_words(&RecognitionRequest::new(image.clone()))
            .await;
        assert_eq!(outcome.text(), Some("EXIT NOW"));
        assert_eq!(words.map(|w| w.words.len()), Some(2));

        let hits = server.hits();
        assert_eq!(hits.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&hits[0].body).unwrap();
        let sent = body["requests"][0]["image"]["content"].as_str().unwrap();
        assert_ne!(sent, wordbot_media::to_transport(&image).data);
    }

    #[tokio::test]
    async fn without_a_reporter_no_words_are_returned() {
        let server = serve(200, reply("HELLO")).await;
        let (outcome, words) = gemini(&server.base_url, Some("k"))
            .recognize_with_words(&RecognitionRequest::new(sample_image()))
            .await;
        assert_eq!(outcome.text(), Some("HELLO"));
        assert!(words.is_none());
    }

    #[tokio::test]
    async fn enhancement_sends_a_png_of_the_same_size() {
        let server = serve(200, reply("HELLO")).await;
        let recognizer =
            gemini(&server.base_url, Some("k")).with_enhancement(Some(EnhanceParams::default()));
        let image = sample_image();
        let outcome = recognizer.recognize(&RecognitionRequest::new(image.clone())).await;
        assert_eq!(outcome.text(), Some("HELLO"));

        let body: serde_json::Value = serde_json::from_str(&server.hits()[0].body).unwrap();
        let sent = wordbot_media::TransportImage {
            mime_type: body["contents"][0]["parts"][1]["inlineData"]["mimeType"]
                .as_str()
                .unwrap()
                .to_string(),
            data: body["contents"][0]["parts"][1]["inlineData"]["data"]
                .as_str()
                .unwrap()
                .to_string(),
        };
        let decoded = wordbot_media::from_transport(&sent).unwrap();
        assert_eq!((decoded.width, decoded.height), (image.width, image.height));
        assert_ne!(decoded.data, image.data);
    }
}
