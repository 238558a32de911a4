//! Staged recognition pipeline with a measured report.
//!
//! Four stages run in order: preprocess, recognize, post-process and
//! summarize. Every number in the [`AgentReport`] is read off the image, the
//! reply, or the clock.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use wordbot_core::{Recognition, RecognitionMode, RecognitionRequest, TextRecognizer};
use wordbot_enhance::{EnhanceParams, EnhanceReport};
use wordbot_logging::{EventLogger, RecognitionEvent};

use crate::postprocess::{normalize_whitespace, TextSummary};
use crate::providers::{WordReport, WordReporter};
use crate::recognizer::{enhance_input, finalize, log_outcome};

pub const AGENT_NAME: &str = "VisionTextAgent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preprocess,
    Recognize,
    PostProcess,
    Summarize,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Preprocess,
        Stage::Recognize,
        Stage::PostProcess,
        Stage::Summarize,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Preprocess => "Image preprocessing",
            Stage::Recognize => "Text recognition",
            Stage::PostProcess => "Post-processing",
            Stage::Summarize => "Summary",
        }
    }

    /// Share of the pipeline finished when this stage starts.
    pub fn percent(self) -> u8 {
        let index = Stage::ALL.iter().position(|s| *s == self).unwrap_or_default();
        (index * 100 / Stage::ALL.len()) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub agent: &'static str,
    pub version: &'static str,
    pub run_id: String,
    pub backend: String,
    pub mode: RecognitionMode,
    pub image: ImageSummary,
    pub stages: Vec<StageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancement: Option<EnhanceReport>,
    /// Characters in the backend's reply before post-processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TextSummary>,
    /// Word list from the same engine reply, when a reporter is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<WordReport>,
    /// The outcome rendered as a sentinel string.
    pub result: String,
    pub total_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub stages: Vec<&'static str>,
}

pub fn agent_info() -> AgentInfo {
    AgentInfo {
        name: AGENT_NAME,
        version: env!("CARGO_PKG_VERSION"),
        stages: Stage::ALL.iter().map(|s| s.label()).collect(),
    }
}

pub struct VisionTextAgent {
    backend: Arc<dyn TextRecognizer>,
    words: Option<Arc<dyn WordReporter>>,
    enhancement: Option<EnhanceParams>,
}

impl VisionTextAgent {
    pub fn new(backend: Arc<dyn TextRecognizer>) -> Self {
        Self {
            backend,
            words: None,
            enhancement: None,
        }
    }

    /// Recognize through `reporter` so the report also lists the words.
    pub fn with_word_reporter(mut self, reporter: Option<Arc<dyn WordReporter>>) -> Self {
        self.words = reporter;
        self
    }

    /// Run the preprocess stage with `params`; `None` records it as skipped.
    pub fn with_enhancement(mut self, params: Option<EnhanceParams>) -> Self {
        self.enhancement = params;
        self
    }

    /// Run every stage for `request`. `progress` is called with each stage
    /// and the percentage finished before it starts.
    pub async fn process<F>(&self, request: &RecognitionRequest, mut progress: F) -> (Recognition, AgentReport)
    where
        F: FnMut(Stage, u8) + Send,
    {
        let run_id = Uuid::new_v4().to_string();
        let backend = self.backend.name().to_string();
        let started = Instant::now();
        let mut stages = Vec::with_capacity(Stage::ALL.len());
        info!(run_id = %run_id, backend = %backend, "Agent run started");
        EventLogger::log_event(
            &run_id,
            RecognitionEvent::Started {
                backend: backend.clone(),
                image: request.image.describe(),
            },
        );

        // Preprocess
        progress(Stage::Preprocess, Stage::Preprocess.percent());
        let stage_start = Instant::now();
        let mut image = request.image.clone();
        let mut enhancement = None;
        let preprocess = match &self.enhancement {
            None => record(Stage::Preprocess, StageStatus::Skipped, stage_start, Some("enhancement disabled".into())),
            Some(params) => match enhance_input(&request.image, params).await {
                Ok((enhanced, report)) => {
                    let note = report
                        .contrast_change_percent
                        .map(|p| format!("contrast change {p:+.1}%"));
                    image = enhanced;
                    enhancement = Some(report);
                    record(Stage::Preprocess, StageStatus::Completed, stage_start, note)
                }
                Err(e) => {
                    warn!(error = %e, "Enhancement failed, using the original image");
                    record(Stage::Preprocess, StageStatus::Failed, stage_start, Some(e.to_string()))
                }
            },
        };
        stages.push(preprocess);

        // Recognize
        progress(Stage::Recognize, Stage::Recognize.percent());
        let stage_start = Instant::now();
        let call = RecognitionRequest {
            image,
            ..request.clone()
        };
        let mut words = None;
        let reply = match &self.words {
            Some(reporter) => reporter.words(&call).await.map(|report| {
                let text = report.text.clone();
                words = Some(report);
                text
            }),
            None => self.backend.recognize(&call).await,
        };
        let reply_chars = reply.as_ref().ok().map(|r| r.chars().count());
        let reply = match reply {
            Ok(text) => {
                stages.push(record(Stage::Recognize, StageStatus::Completed, stage_start, None));
                Ok(text)
            }
            Err(e) => {
                stages.push(record(Stage::Recognize, StageStatus::Failed, stage_start, Some(e.to_string())));
                Err(e)
            }
        };

        // Post-process
        progress(Stage::PostProcess, Stage::PostProcess.percent());
        let stage_start = Instant::now();
        let outcome = match reply {
            Ok(text) => {
                let outcome = finalize(&normalize_whitespace(&text), request.mode);
                let note = match &outcome {
                    Recognition::Text(t) => format!("{} word(s) kept", t.split_whitespace().count()),
                    _ => "no text in reply".to_string(),
                };
                stages.push(record(Stage::PostProcess, StageStatus::Completed, stage_start, Some(note)));
                outcome
            }
            Err(e) => {
                stages.push(record(Stage::PostProcess, StageStatus::Skipped, stage_start, None));
                Recognition::Failed(e)
            }
        };

        // Summarize
        progress(Stage::Summarize, Stage::Summarize.percent());
        let stage_start = Instant::now();
        let summary = outcome.text().map(TextSummary::of);
        let status = if summary.is_some() {
            StageStatus::Completed
        } else {
            StageStatus::Skipped
        };
        stages.push(record(Stage::Summarize, status, stage_start, None));

        let total_ms = started.elapsed().as_millis() as u64;
        log_outcome(&run_id, backend.clone(), &outcome, total_ms);
        debug!(run_id = %run_id, total_ms, "Agent run finished");

        let report = AgentReport {
            agent: AGENT_NAME,
            version: env!("CARGO_PKG_VERSION"),
            run_id,
            backend,
            mode: request.mode,
            image: ImageSummary {
                width: request.image.width,
                height: request.image.height,
                format: request.image.format.to_string(),
                bytes: request.image.data.len(),
            },
            stages,
            enhancement,
            reply_chars,
            summary,
            words,
            result: outcome.to_sentinel(),
            total_ms,
        };
        (outcome, report)
    }
}

fn record(stage: Stage, status: StageStatus, started: Instant, note: Option<String>) -> StageRecord {
    StageRecord {
        stage,
        status,
        duration_ms: started.elapsed().as_millis() as u64,
        note,
    }
}
