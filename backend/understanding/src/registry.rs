//! Build backends from the loaded configuration.

use std::sync::Arc;
use std::time::Duration;

use wordbot_config::defaults::{
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TESSERACT_DPI, DEFAULT_TESSERACT_LANG,
};
use wordbot_config::{BackendKind, WordbotConfig};
use wordbot_core::{RecognitionMode, TextRecognizer};
use wordbot_enhance::EnhanceParams;

use crate::providers::{CloudVisionRecognizer, GeminiRecognizer, TesseractRecognizer, WordReporter};

/// Mode from `recognition.mode`; unset or unrecognized values give the default.
pub fn default_mode(config: &WordbotConfig) -> RecognitionMode {
    config
        .recognition
        .as_ref()
        .and_then(|r| r.mode.as_deref())
        .and_then(RecognitionMode::from_config)
        .unwrap_or_default()
}

pub fn default_prompt(config: &WordbotConfig) -> Option<&str> {
    config.recognition.as_ref().and_then(|r| r.prompt.as_deref())
}

/// Enhancement parameters when the pre-pass is switched on in config.
pub fn enhancement(config: &WordbotConfig) -> Option<EnhanceParams> {
    config
        .recognition
        .as_ref()
        .and_then(|r| r.enhance)
        .unwrap_or(false)
        .then(EnhanceParams::default)
}

pub fn request_timeout(config: &WordbotConfig) -> Duration {
    let secs = config
        .recognition
        .as_ref()
        .and_then(|r| r.request_timeout_secs)
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub fn gemini(config: &WordbotConfig) -> GeminiRecognizer {
    let mut gemini = GeminiRecognizer::new(config.model_api_key().map(str::to_string))
        .with_timeout(request_timeout(config));
    if let Some(model) = &config.model {
        let vision = model.vision_model.clone().unwrap_or_else(|| gemini.vision_model().to_string());
        let text = model.text_model.clone().unwrap_or_else(|| vision.clone());
        gemini = gemini.with_models(vision, text);
        if let Some(url) = &model.base_url {
            gemini = gemini.with_base_url(url);
        }
    }
    gemini
}

pub fn cloud_vision(config: &WordbotConfig) -> CloudVisionRecognizer {
    let mut vision = CloudVisionRecognizer::new(config.vision_api_key().map(str::to_string))
        .with_timeout(request_timeout(config));
    if let Some(section) = &config.vision {
        if let Some(url) = &section.base_url {
            vision = vision.with_base_url(url);
        }
        if let Some(max) = section.max_results {
            vision = vision.with_max_results(max);
        }
    }
    vision
}

pub fn tesseract(config: &WordbotConfig) -> TesseractRecognizer {
    let section = config.tesseract.as_ref();
    TesseractRecognizer::new(
        section
            .and_then(|t| t.lang.clone())
            .unwrap_or_else(|| DEFAULT_TESSERACT_LANG.to_string()),
        section.and_then(|t| t.dpi).unwrap_or(DEFAULT_TESSERACT_DPI),
    )
}

pub fn build_backend(config: &WordbotConfig, kind: BackendKind) -> Arc<dyn TextRecognizer> {
    match kind {
        BackendKind::Gemini => Arc::new(gemini(config)),
        BackendKind::Vision => Arc::new(cloud_vision(config)),
        BackendKind::Tesseract => Arc::new(tesseract(config)),
    }
}

/// Backends that can list individual words. Gemini replies with free text only.
pub fn build_word_reporter(config: &WordbotConfig, kind: BackendKind) -> Option<Arc<dyn WordReporter>> {
    match kind {
        BackendKind::Gemini => None,
        BackendKind::Vision => Some(Arc::new(cloud_vision(config))),
        BackendKind::Tesseract => Some(Arc::new(tesseract(config))),
    }
}
