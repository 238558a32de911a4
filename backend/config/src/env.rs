//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside YAML string values, resolved at load time
//!   (`$${VAR}` is an escape for a literal `${VAR}`);
//! - a fixed set of well-known variables (`MODEL_API_KEY`, ...) that override
//!   whatever the file says.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{CloudVisionConfig, LoggingConfig, ModelConfig, WordbotConfig};

pub const MODEL_API_KEY: &str = "MODEL_API_KEY";
pub const MODEL_NAME_VISION: &str = "MODEL_NAME_VISION";
pub const MODEL_NAME_TEXT: &str = "MODEL_NAME_TEXT";
pub const GOOGLE_VISION_API_KEY: &str = "GOOGLE_VISION_API_KEY";
pub const WORDBOT_LOG_LEVEL: &str = "WORDBOT_LOG_LEVEL";

/// Optional leading `$` marks an escaped reference.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Resolve `${VAR}` references in every string leaf of `value`.
///
/// A reference to an unset or empty variable is an error naming the config path.
pub fn resolve_env_vars(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    resolve_at(value, env, "")
}

fn resolve_at(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    Ok(match value {
        Value::String(s) => Value::String(resolve_string(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| resolve_at(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                out.insert(k.clone(), resolve_at(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn resolve_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let resolved = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name).filter(|v| !v.is_empty()) {
            Some(v) => v.clone(),
            None => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(resolved.into_owned())
}

/// Apply the well-known variables on top of a loaded config.
pub fn apply_env_overlay(mut config: WordbotConfig, env: &HashMap<String, String>) -> WordbotConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(key) = get(MODEL_API_KEY) {
        config.model.get_or_insert_with(ModelConfig::default).api_key = Some(key);
    }
    if let Some(name) = get(MODEL_NAME_VISION) {
        config.model.get_or_insert_with(ModelConfig::default).vision_model = Some(name);
    }
    if let Some(name) = get(MODEL_NAME_TEXT) {
        config.model.get_or_insert_with(ModelConfig::default).text_model = Some(name);
    }
    if let Some(key) = get(GOOGLE_VISION_API_KEY) {
        config.vision.get_or_insert_with(CloudVisionConfig::default).api_key = Some(key);
    }
    if let Some(level) = get(WORDBOT_LOG_LEVEL) {
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level);
    }
    config
}
