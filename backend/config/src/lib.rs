//! `wordbot-config`: runtime configuration for wordbot.
//!
//! Provides:
//! - Typed config schema (model, Cloud Vision, Tesseract, recognition, logging)
//! - YAML read/atomic write
//! - `${ENV_VAR}` substitution and the well-known env overlay
//! - Default value application
//! - Validation with path-tagged messages
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{apply_env_overlay, process_env, resolve_env_vars, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw_config, write_config};
pub use redact::{collect_redacted_paths, redact};
pub use schema::{BackendKind, WordbotConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute `${VAR}`s, overlay well-known env vars,
/// apply defaults, and validate the result.
///
/// This is the main entry point for loading a config at runtime. Findings
/// are returned rather than logged so the caller can report them once its
/// subscriber is installed.
pub async fn load_and_prepare(
    path: &Path,
    env: &HashMap<String, String>,
) -> Result<(WordbotConfig, ValidationReport)> {
    let raw = load_raw_config(path).await?;
    let resolved = resolve_env_vars(&raw, env).context("Failed to resolve env vars in config")?;

    let config: WordbotConfig =
        serde_json::from_value(resolved).context("Failed to deserialize config")?;
    let config = apply_all_defaults(apply_env_overlay(config, env));
    let report = validate(&config);
    Ok((config, report))
}
