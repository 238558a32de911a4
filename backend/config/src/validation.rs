//! Config validation: checks that produce path-tagged errors and warnings.

use crate::schema::{BackendKind, WordbotConfig};
use thiserror::Error;
use wordbot_core::RecognitionMode;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &WordbotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_credentials(config, &mut report);
    validate_urls(config, &mut report);
    validate_recognition(config, &mut report);
    validate_logging(config, &mut report);
    report
}

/// A missing key for the selected backend is only a warning: recognition
/// still runs and reports the credential sentinel.
fn validate_credentials(config: &WordbotConfig, report: &mut ValidationReport) {
    match config.backend() {
        BackendKind::Gemini if config.model_api_key().is_none() => {
            report.warn("model.apiKey", "No model API key; set MODEL_API_KEY");
        }
        BackendKind::Vision if config.vision_api_key().is_none() => {
            report.warn(
                "vision.apiKey",
                "No Cloud Vision API key; set GOOGLE_VISION_API_KEY",
            );
        }
        _ => {}
    }
}

fn validate_urls(config: &WordbotConfig, report: &mut ValidationReport) {
    let urls = [
        ("model.baseUrl", config.model.as_ref().and_then(|m| m.base_url.as_deref())),
        ("vision.baseUrl", config.vision.as_ref().and_then(|v| v.base_url.as_deref())),
    ];
    for (path, url) in urls {
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                report.error(path, format!("'{url}' is not an http(s) URL"));
            }
        }
    }
}

fn validate_recognition(config: &WordbotConfig, report: &mut ValidationReport) {
    if let Some(vision) = &config.vision {
        if vision.max_results == Some(0) {
            report.error("vision.maxResults", "maxResults must be >= 1");
        }
    }
    let Some(rec) = &config.recognition else { return };
    if let Some(mode) = &rec.mode {
        if RecognitionMode::from_config(mode).is_none() {
            report.error(
                "recognition.mode",
                format!("Unknown mode '{mode}'. Use 'single' or 'multi'"),
            );
        }
    }
    if rec.request_timeout_secs == Some(0) {
        report.error("recognition.requestTimeoutSecs", "timeout must be > 0");
    }
    if let Some(prompt) = &rec.prompt {
        if prompt.trim().is_empty() {
            report.warn("recognition.prompt", "Blank prompt; the built-in prompt is used");
        }
    }
}

fn validate_logging(config: &WordbotConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        // EnvFilter directives like "wordbot=debug" are accepted as-is.
        if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            report.error("logging.level", format!("Unknown log level '{level}'"));
        }
    }
}
