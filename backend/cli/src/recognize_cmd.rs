//! `wordbot recognize`

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use wordbot_config::{BackendKind, WordbotConfig};
use wordbot_core::{Recognition, RecognitionMode, RecognitionRequest};
use wordbot_enhance::EnhanceParams;
use wordbot_understanding::registry;
use wordbot_understanding::{AgentReport, Recognizer, StageStatus, VisionTextAgent, WordReport};

use crate::terminal_output::{note_warn, render_table, Column};

pub struct RecognizeArgs {
    pub image: PathBuf,
    pub backend: Option<BackendKind>,
    pub mode: Option<RecognitionMode>,
    pub prompt: Option<String>,
    pub enhance: bool,
    pub agent: bool,
    pub json: bool,
    pub words: bool,
}

/// Prints the outcome as a sentinel string. Only an unreadable image file is
/// an error; recognition failures are printed and exit cleanly.
pub async fn run(config: &WordbotConfig, args: RecognizeArgs) -> Result<()> {
    let image = wordbot_media::load_image(&args.image)
        .await
        .with_context(|| format!("Cannot read image {}", args.image.display()))?;

    let kind = args.backend.unwrap_or_else(|| config.backend());
    let mode = args.mode.unwrap_or_else(|| registry::default_mode(config));
    let prompt = args.prompt.as_deref().or_else(|| registry::default_prompt(config));
    let request = RecognitionRequest::new(image).with_prompt(prompt).with_mode(mode);
    let enhancement = if args.enhance {
        Some(EnhanceParams::default())
    } else {
        registry::enhancement(config)
    };
    let backend = registry::build_backend(config, kind);
    let reporter = if args.words {
        let reporter = registry::build_word_reporter(config, kind);
        if reporter.is_none() {
            note_warn(&format!("{} does not report individual words", kind.as_str()));
        }
        reporter
    } else {
        None
    };

    if args.agent {
        let quiet = args.json;
        let agent = VisionTextAgent::new(backend)
            .with_enhancement(enhancement)
            .with_word_reporter(reporter);
        let (outcome, report) = agent
            .process(&request, move |stage, percent| {
                if !quiet {
                    eprintln!("[{percent:>3}%] {}", stage.label());
                }
            })
            .await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
            println!("{outcome}");
            if let Some(words) = &report.words {
                print!("{}", words_table(words));
            }
        }
    } else {
        let recognizer = Recognizer::new(backend)
            .with_enhancement(enhancement)
            .with_word_reporter(reporter);
        let (outcome, words) = recognizer.recognize_with_words(&request).await;
        if args.json {
            let body = json_output(recognizer.backend_name(), mode, &outcome, words.as_ref());
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("{outcome}");
            if let Some(words) = &words {
                print!("{}", words_table(words));
            }
        }
    }
    Ok(())
}

/// One JSON document per run; the word list is nested when present.
fn json_output(
    backend: &str,
    mode: RecognitionMode,
    outcome: &Recognition,
    words: Option<&WordReport>,
) -> Value {
    let mut body = json!({
        "backend": backend,
        "mode": mode,
        "status": status_of(outcome),
        "result": outcome.to_sentinel(),
    });
    if let Some(words) = words {
        body["words"] = json!(words);
    }
    body
}

fn status_of(outcome: &Recognition) -> &'static str {
    match outcome {
        Recognition::Text(_) => "text",
        Recognition::NoText => "no_text",
        Recognition::Failed(_) => "error",
    }
}

fn print_report(report: &AgentReport) {
    eprintln!(
        "{} v{} | backend {} | image {}x{} {}",
        report.agent,
        report.version,
        report.backend,
        report.image.width,
        report.image.height,
        report.image.format
    );
    for stage in &report.stages {
        let status = match stage.status {
            StageStatus::Completed => "done",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        };
        let note = stage.note.as_deref().map(|n| format!(" ({n})")).unwrap_or_default();
        eprintln!("  {:<20} {:<8} {:>6} ms{note}", stage.stage.label(), status, stage.duration_ms);
    }
    if let Some(summary) = &report.summary {
        eprintln!(
            "  {} word(s), {} letter(s), {} digit(s), {} other",
            summary.words, summary.letters, summary.digits, summary.other
        );
    }
    eprintln!("  total {} ms", report.total_ms);
}

fn words_table(report: &WordReport) -> String {
    let columns = [
        Column::left("Word").max_width(32),
        Column::right("Conf"),
        Column::left("Box"),
    ];
    let rows: Vec<Vec<String>> = report
        .words
        .iter()
        .map(|w| {
            vec![
                w.text.clone(),
                w.confidence.map(|c| format!("{c:.1}")).unwrap_or_else(|| "-".into()),
                w.bbox
                    .map(|b| format!("{},{} {}x{}", b.left, b.top, b.width, b.height))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    let mut out = render_table(&columns, &rows);
    if let Some(mean) = report.mean_confidence {
        out.push_str(&format!("  mean confidence {mean:.1}\n"));
    }
    out
}
