//! Config file location, reading, and atomic writing.

use crate::schema::WordbotConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the config directory.
/// Priority: `WORDBOT_CONFIG_DIR` env > `~/.wordbot/` > `./.wordbot`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WORDBOT_CONFIG_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".wordbot"))
        .unwrap_or_else(|| PathBuf::from(".wordbot"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped tree so `${VAR}` references can be
/// resolved before the typed parse.
///
/// A missing file is not an error: it reads as an empty mapping.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Write config atomically (temp file, then rename), keeping the previous
/// version as `config.yaml.bak`.
pub async fn write_config(config: &WordbotConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    if path.exists() {
        let backup = path.with_extension("yaml.bak");
        if let Err(e) = fs::copy(path, &backup).await {
            warn!("Failed to back up {}: {}", path.display(), e);
        }
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BackendKind, RecognitionConfig};

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_raw_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(value, Value::Object(Default::default()));
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        let cfg = WordbotConfig {
            recognition: Some(RecognitionConfig {
                backend: Some(BackendKind::Vision),
                ..Default::default()
            }),
            ..Default::default()
        };
        write_config(&cfg, &path).await.unwrap();
        let value = load_raw_config(&path).await.unwrap();
        assert_eq!(value["recognition"]["backend"], "vision");
    }

    #[tokio::test]
    async fn second_write_leaves_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        write_config(&WordbotConfig::default(), &path).await.unwrap();
        write_config(&WordbotConfig::default(), &path).await.unwrap();
        assert!(path.with_extension("yaml.bak").exists());
        assert!(!path.with_extension("yaml.tmp").exists());
    }
}
