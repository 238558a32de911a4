//! `wordbot models`: Gemini models that accept images through generateContent.

use anyhow::{Context, Result};

use wordbot_config::WordbotConfig;
use wordbot_understanding::{registry, ModelInfo};

use crate::terminal_output::{note_info, render_table, Column};

pub async fn run(config: &WordbotConfig) -> Result<()> {
    let gemini = registry::gemini(config);
    let models = gemini
        .list_models()
        .await
        .context("Cannot list Gemini models")?;

    if models.is_empty() {
        note_info("No models with generateContent support were returned");
        return Ok(());
    }
    print!("{}", models_table(&models, gemini.vision_model()));
    Ok(())
}

/// The configured vision model is marked with `*`.
fn models_table(models: &[ModelInfo], configured: &str) -> String {
    let columns = [
        Column::left("Name").max_width(48),
        Column::left("Display Name").max_width(40),
        Column::left("Methods"),
    ];
    let rows: Vec<Vec<String>> = models
        .iter()
        .map(|m| {
            let short = m.name.strip_prefix("models/").unwrap_or(&m.name);
            let name = if short == configured.strip_prefix("models/").unwrap_or(configured) {
                format!("{short} *")
            } else {
                short.to_string()
            };
            vec![name, m.display_name.clone(), m.supported_generation_methods.join(", ")]
        })
        .collect();
    render_table(&columns, &rows)
}
