//! `wordbot config show|init`

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{error, warn};

use wordbot_config::{
    apply_all_defaults, collect_redacted_paths, redact, write_config, ValidationReport,
    WordbotConfig,
};

use crate::terminal_output::{note_info, note_warn};

/// Log validation findings. With `strict`, any error fails the command.
pub fn check_findings(report: &ValidationReport, strict: bool) -> Result<()> {
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for problem in &report.errors {
        error!(path = %problem.path, message = %problem.message, "Config error");
    }
    if strict && !report.is_valid() {
        bail!(
            "Config has {} error(s); run `wordbot doctor` for details",
            report.errors.len()
        );
    }
    Ok(())
}

pub fn show(config: &WordbotConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        note_warn(&format!("{} not found, showing defaults and environment", path.display()));
    }
    let (yaml, masked) = render(config)?;
    println!("# {}", path.display());
    print!("{yaml}");
    if !masked.is_empty() {
        note_info(&format!("Masked: {}", masked.join(", ")));
    }
    Ok(())
}

/// YAML with every credential masked, plus the dotted paths that were masked.
fn render(config: &WordbotConfig) -> Result<(String, Vec<String>)> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let masked = collect_redacted_paths(&value);
    let yaml = serde_yaml::to_string(&redact(&value)).context("Failed to render config as YAML")?;
    Ok((yaml, masked))
}

/// Keys are never written; they stay in the environment.
pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        note_warn(&format!("{} already exists; pass --force to overwrite", path.display()));
        return Ok(());
    }
    write_config(&apply_all_defaults(WordbotConfig::default()), path).await?;
    note_info(&format!("Wrote {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbot_config::schema::{ModelConfig, RecognitionConfig};
    use wordbot_config::validate;

    fn broken() -> WordbotConfig {
        WordbotConfig {
            model: Some(ModelConfig {
                base_url: Some("ftp://nope".into()),
                ..Default::default()
            }),
            recognition: Some(RecognitionConfig {
                mode: Some("paragraph".into()),
                request_timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn errors_fail_strict_commands() {
        let report = validate(&broken());
        let err = check_findings(&report, true).unwrap_err();
        assert!(err.to_string().contains("3 error(s)"));
        assert!(check_findings(&report, false).is_ok());
    }

    #[test]
    fn warnings_alone_do_not_fail() {
        let report = validate(&WordbotConfig::default());
        assert!(report.is_valid());
        assert!(!report.warnings.is_empty());
        check_findings(&report, true).unwrap();
    }

    #[test]
    fn render_masks_keys() {
        let config = WordbotConfig {
            model: Some(ModelConfig {
                api_key: Some("AIzaSyA-very-secret-key-value-1234567890".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let (yaml, masked) = render(&config).unwrap();
        assert!(!yaml.contains("very-secret"));
        assert!(yaml.contains("AIza***"));
        assert_eq!(masked, vec!["model.apiKey"]);
    }

    #[test]
    fn nothing_masked_without_credentials() {
        let (_, masked) = render(&WordbotConfig::default()).unwrap();
        assert!(masked.is_empty());
    }

    #[tokio::test]
    async fn init_writes_defaults_and_respects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false).await.unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("gemini"));
        assert!(!written.contains("apiKey"));

        std::fs::write(&path, "recognition:\n  backend: tesseract\n").unwrap();
        init(&path, false).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("tesseract"));

        init(&path, true).await.unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("backend: tesseract"));
    }
}
