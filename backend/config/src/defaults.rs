//! Config defaults: fills every unset field the runtime reads.

use crate::schema::{
    CloudVisionConfig, LoggingConfig, ModelConfig, RecognitionConfig, TesseractConfig,
    WordbotConfig,
};

pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CLOUD_VISION_BASE_URL: &str = "https://vision.googleapis.com";

/// Cloud Vision `maxResults` for TEXT_DETECTION.
pub const DEFAULT_VISION_MAX_RESULTS: u32 = 10;

pub const DEFAULT_TESSERACT_LANG: &str = "eng";
pub const DEFAULT_TESSERACT_DPI: i32 = 300;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: WordbotConfig) -> WordbotConfig {
    let config = apply_model_defaults(config);
    let config = apply_vision_defaults(config);
    let config = apply_tesseract_defaults(config);
    let config = apply_recognition_defaults(config);
    apply_logging_defaults(config)
}

fn apply_model_defaults(mut config: WordbotConfig) -> WordbotConfig {
    let model = config.model.get_or_insert_with(ModelConfig::default);
    model
        .vision_model
        .get_or_insert_with(|| DEFAULT_VISION_MODEL.to_string());
    model
        .text_model
        .get_or_insert_with(|| DEFAULT_TEXT_MODEL.to_string());
    model
        .base_url
        .get_or_insert_with(|| DEFAULT_GEMINI_BASE_URL.to_string());
    config
}

fn apply_vision_defaults(mut config: WordbotConfig) -> WordbotConfig {
    let vision = config.vision.get_or_insert_with(CloudVisionConfig::default);
    vision
        .base_url
        .get_or_insert_with(|| DEFAULT_CLOUD_VISION_BASE_URL.to_string());
    vision.max_results.get_or_insert(DEFAULT_VISION_MAX_RESULTS);
    config
}

fn apply_tesseract_defaults(mut config: WordbotConfig) -> WordbotConfig {
    let tess = config.tesseract.get_or_insert_with(TesseractConfig::default);
    tess.lang
        .get_or_insert_with(|| DEFAULT_TESSERACT_LANG.to_string());
    tess.dpi.get_or_insert(DEFAULT_TESSERACT_DPI);
    config
}

fn apply_recognition_defaults(mut config: WordbotConfig) -> WordbotConfig {
    let rec = config.recognition.get_or_insert_with(RecognitionConfig::default);
    rec.backend.get_or_insert_with(Default::default);
    rec.mode.get_or_insert_with(|| "multi".to_string());
    rec.enhance.get_or_insert(false);
    rec.request_timeout_secs
        .get_or_insert(DEFAULT_REQUEST_TIMEOUT_SECS);
    config
}

fn apply_logging_defaults(mut config: WordbotConfig) -> WordbotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging
        .level
        .get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BackendKind;

    #[test]
    fn fills_model_names() {
        let cfg = apply_all_defaults(WordbotConfig::default());
        let model = cfg.model.unwrap();
        assert_eq!(model.vision_model.as_deref(), Some(DEFAULT_VISION_MODEL));
        assert_eq!(model.text_model.as_deref(), Some(DEFAULT_TEXT_MODEL));
        assert_eq!(model.base_url.as_deref(), Some(DEFAULT_GEMINI_BASE_URL));
    }

    #[test]
    fn fills_recognition_section() {
        let cfg = apply_all_defaults(WordbotConfig::default());
        let rec = cfg.recognition.unwrap();
        assert_eq!(rec.backend, Some(BackendKind::Gemini));
        assert_eq!(rec.mode.as_deref(), Some("multi"));
        assert_eq!(rec.enhance, Some(false));
        assert_eq!(rec.request_timeout_secs, Some(DEFAULT_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn keeps_user_values() {
        let mut cfg = WordbotConfig::default();
        cfg.recognition = Some(RecognitionConfig {
            backend: Some(BackendKind::Vision),
            request_timeout_secs: Some(5),
            ..Default::default()
        });
        cfg.tesseract = Some(TesseractConfig {
            lang: Some("deu".into()),
            dpi: None,
        });
        let cfg = apply_all_defaults(cfg);
        let rec = cfg.recognition.unwrap();
        assert_eq!(rec.backend, Some(BackendKind::Vision));
        assert_eq!(rec.request_timeout_secs, Some(5));
        let tess = cfg.tesseract.unwrap();
        assert_eq!(tess.lang.as_deref(), Some("deu"));
        assert_eq!(tess.dpi, Some(DEFAULT_TESSERACT_DPI));
    }
}
