use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use wordbot_core::{RecognitionError, RecognitionRequest, TextRecognizer};
use wordbot_media::to_inline_transport;

use super::{build_client, error_from_status, transport_error};

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Prompt of the text-only credential check.
const HEALTH_PROMPT: &str = "System check";
/// Upper bound on ListModels pages followed.
const MAX_MODEL_PAGES: usize = 20;

/// Google Gemini `generateContent` with an inline image part.
pub struct GeminiRecognizer {
    client: Client,
    api_key: Option<String>,
    vision_model: String,
    text_model: String,
    base_url: String,
}

impl GeminiRecognizer {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: build_client(None),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            vision_model: DEFAULT_MODEL.to_string(),
            text_model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, vision: impl Into<String>, text: impl Into<String>) -> Self {
        self.vision_model = vision.into();
        self.text_model = text.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(Some(timeout));
        self
    }

    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Model used by [`check_credentials`](Self::check_credentials).
    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    fn key(&self) -> Result<&str, RecognitionError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RecognitionError::missing_credentials(PROVIDER))
    }

    async fn generate(&self, model: &str, body: &GenerateRequest<'_>) -> Result<String, RecognitionError> {
        let key = self.key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            model.trim_start_matches("models/")
        );
        debug!(model = %model, "Sending request to Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(body)
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

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| RecognitionError::malformed(PROVIDER, e))?;
        parsed.into_text()
    }

    /// Text-only request against the text model. `Ok` means the key was accepted.
    pub async fn check_credentials(&self) -> Result<(), RecognitionError> {
        let started = Instant::now();
        let body = GenerateRequest::text_only(HEALTH_PROMPT);
        self.generate(&self.text_model, &body).await?;
        debug!(latency_ms = started.elapsed().as_millis() as u64, "Gemini credential check passed");
        Ok(())
    }

    /// Models that support `generateContent`, following every page.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, RecognitionError> {
        let key = self.key()?;
        let url = format!("{}/v1beta/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut query = vec![("key", key.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self
                .client
                .get(&url)
                .query(&query)
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

            let page: ListModelsResponse =
                serde_json::from_str(&text).map_err(|e| RecognitionError::malformed(PROVIDER, e))?;
            models.extend(page.models.into_iter().filter(ModelInfo::supports_generate_content));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(models),
            }
        }
        debug!(pages = MAX_MODEL_PAGES, "Stopped following ListModels pages");
        Ok(models)
    }
}

#[async_trait]
impl TextRecognizer for GeminiRecognizer {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn recognize(&self, request: &RecognitionRequest) -> Result<String, RecognitionError> {
        let payload = to_inline_transport(&request.image)?;
        let body = GenerateRequest::with_image(&request.prompt, &payload.mime_type, &payload.data);
        self.generate(&self.vision_model, &body).await
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn text_only(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part::Text { text: prompt }],
            }],
        }
    }

    fn with_image(prompt: &'a str, mime_type: &'a str, data: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData { mime_type, data },
                    },
                ],
            }],
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate. No candidates is an
    /// empty reply unless the prompt was blocked.
    fn into_text(self) -> Result<String, RecognitionError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(RecognitionError::malformed(
                PROVIDER,
                format!("prompt blocked: {reason}"),
            ));
        }
        Ok(self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

/// One entry of the ListModels reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}
