//! `wordbot doctor`: one pass/fail line per check.

use std::path::Path;

use anyhow::{bail, Result};
use image::{DynamicImage, Rgb, RgbImage};

use wordbot_config::env::{GOOGLE_VISION_API_KEY, MODEL_API_KEY};
use wordbot_config::{validate, WordbotConfig};
use wordbot_core::{RecognitionRequest, TextRecognizer};
use wordbot_understanding::{registry, tesseract_version};

use crate::terminal_output::{check_line, CheckStatus};

struct Check {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl Check {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self { name, status, detail: detail.into() }
    }
}

pub async fn run(config: &WordbotConfig, config_path: &Path) -> Result<()> {
    println!("\nRunning wordbot doctor...\n");

    let mut checks = config_checks(config, config_path);
    checks.push(tesseract_check().await);
    checks.push(gemini_check(config).await);
    checks.push(vision_check(config).await);

    for check in &checks {
        println!("{}", check_line(check.status, check.name, &check.detail));
    }

    println!();
    verdict(&checks)
}

fn verdict(checks: &[Check]) -> Result<()> {
    let failed = checks.iter().filter(|c| c.status == CheckStatus::Fail).count();
    if failed > 0 {
        bail!("{failed} check(s) failed. Fix the errors above.");
    }
    println!("All required checks passed.");
    Ok(())
}

fn config_checks(config: &WordbotConfig, config_path: &Path) -> Vec<Check> {
    let mut checks = Vec::new();
    let location = if config_path.exists() {
        Check::new("config file", CheckStatus::Pass, config_path.display().to_string())
    } else {
        Check::new(
            "config file",
            CheckStatus::Warn,
            format!("{} not found, using defaults and environment", config_path.display()),
        )
    };
    checks.push(location);

    let report = validate(config);
    for error in &report.errors {
        checks.push(Check::new("config", CheckStatus::Fail, format!("{}: {}", error.path, error.message)));
    }
    for warning in &report.warnings {
        checks.push(Check::new("config", CheckStatus::Warn, format!("{}: {}", warning.path, warning.message)));
    }

    checks.push(key_check(MODEL_API_KEY, config.model_api_key().is_some()));
    checks.push(key_check(GOOGLE_VISION_API_KEY, config.vision_api_key().is_some()));
    checks
}

fn key_check(var: &'static str, present: bool) -> Check {
    if present {
        Check::new(var, CheckStatus::Pass, "is set")
    } else {
        Check::new(var, CheckStatus::Warn, "is missing (optional unless that backend is used)")
    }
}

async fn tesseract_check() -> Check {
    match tokio::task::spawn_blocking(tesseract_version).await {
        Ok(Ok(version)) => Check::new("tesseract", CheckStatus::Pass, version),
        Ok(Err(e)) => Check::new("tesseract", CheckStatus::Warn, format!("not available: {e}")),
        Err(e) => Check::new("tesseract", CheckStatus::Warn, format!("check did not finish: {e}")),
    }
}

async fn gemini_check(config: &WordbotConfig) -> Check {
    if config.model_api_key().is_none() {
        return Check::new("gemini credentials", CheckStatus::Warn, "skipped, no key");
    }
    let gemini = registry::gemini(config);
    match gemini.check_credentials().await {
        Ok(()) => Check::new(
            "gemini credentials",
            CheckStatus::Pass,
            format!("key accepted by {}", gemini.text_model()),
        ),
        Err(e) => Check::new("gemini credentials", CheckStatus::Fail, e.to_string()),
    }
}

/// Sends a blank page: "no text" and text replies both prove the key works.
async fn vision_check(config: &WordbotConfig) -> Check {
    if config.vision_api_key().is_none() {
        return Check::new("cloud vision credentials", CheckStatus::Warn, "skipped, no key");
    }
    let blank = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 32, Rgb([255, 255, 255])));
    let image = match wordbot_media::from_dynamic(&blank) {
        Ok(image) => image,
        Err(e) => return Check::new("cloud vision credentials", CheckStatus::Fail, e.to_string()),
    };
    let vision = registry::cloud_vision(config);
    match vision.recognize(&RecognitionRequest::new(image)).await {
        Ok(_) => Check::new("cloud vision credentials", CheckStatus::Pass, "key accepted"),
        Err(e) => Check::new("cloud vision credentials", CheckStatus::Fail, e.to_string()),
    }
}
