use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use wordbot_core::{RecognitionError, RecognitionRequest, TextRecognizer};
use wordbot_media::to_png_transport;

use super::{
    build_client, error_from_status, transport_error, BoundingBox, GoogleStatus, WordDetail,
    WordReport, WordReporter,
};

const PROVIDER: &str = "vision";
const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";
const DEFAULT_MAX_RESULTS: u32 = 10;

/// Google Cloud Vision `images:annotate` with `TEXT_DETECTION`.
pub struct CloudVisionRecognizer {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: u32,
}

impl CloudVisionRecognizer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: build_client(None),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(Some(timeout));
        self
    }

    /// Annotations for the single image in `request`; empty when nothing was found.
    async fn annotate(&self, request: &RecognitionRequest) -> Result<Vec<TextAnnotation>, RecognitionError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RecognitionError::missing_credentials(PROVIDER))?;
        let payload = to_png_transport(&request.image)?;
        let body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent { content: &payload.data },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                    max_results: self.max_results,
                }],
            }],
        };
        debug!(image = %request.image.describe(), "Sending request to Cloud Vision");

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        if !status.is_success() {
            return Err(error_from_status(PROVIDER, status, &text));
        }

        let parsed: AnnotateResponse =
            serde_json::from_str(&text).map_err(|e| RecognitionError::malformed(PROVIDER, e))?;
        let Some(first) = parsed.responses.into_iter().next() else {
            return Ok(Vec::new());
        };
        // Per-image failures come back with HTTP 200.
        if let Some(error) = first.error {
            return Err(error.into_error(PROVIDER, 200));
        }
        Ok(first.text_annotations)
    }
}

#[async_trait]
impl TextRecognizer for CloudVisionRecognizer {
    fn name(&self) -> &str {
        PROVIDER
    }

    /// The full detected text (first annotation).
    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError> {
        let annotations = self.annotate(request).await?;
        Ok(annotations
            .into_iter()
            .next()
            .map(|a| a.description)
            .unwrap_or_default())
    }
}

#[async_trait]
impl WordReporter for CloudVisionRecognizer {
    /// Word annotations with their boxes. The API reports no confidence for
    /// text detection, so none is given.
    async fn words(&self, request: &RecognitionRequest) -> Result<WordReport, RecognitionError> {
        let mut annotations = self.annotate(request).await?.into_iter();
        let text = annotations.next().map(|a| a.description).unwrap_or_default();
        let words = annotations
            .map(|a| WordDetail {
                bbox: a.bounding_poly.as_ref().and_then(BoundingPoly::bbox),
                text: a.description,
                confidence: None,
            })
            .collect();
        Ok(WordReport::new(text, words))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<ImageRequest<'a>>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    image: ImageContent<'a>,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent<'a> {
    content: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<GoogleStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    bounding_poly: Option<BoundingPoly>,
}

#[derive(Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Missing coordinates are zero on the wire.
#[derive(Deserialize)]
struct Vertex {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

impl BoundingPoly {
    fn bbox(&self) -> Option<BoundingBox> {
        let left = self.vertices.iter().map(|v| v.x).min()?;
        let right = self.vertices.iter().map(|v| v.x).max()?;
        let top = self.vertices.iter().map(|v| v.y).min()?;
        let bottom = self.vertices.iter().map(|v| v.y).max()?;
        Some(BoundingBox {
            left,
            top,
            width: right - left,
            height: bottom - top,
        })
    }
}
