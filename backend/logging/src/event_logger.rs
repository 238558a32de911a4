//! Recognition event log.
//!
//! One structured entry per call start and finish, emitted under the
//! `recognition_events` target so a JSON file layer captures them as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    Started {
        backend: String,
        image: String,
    },
    Completed {
        backend: String,
        /// "text" | "no_text"
        outcome: String,
        chars: usize,
        latency_ms: u64,
    },
    Failed {
        backend: String,
        error: String,
        latency_ms: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: RecognitionEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the entry for `event`, scrubbing error text, and emit it.
    pub fn log_event(run_id: &str, mut event: RecognitionEvent) -> EventLogEntry {
        if let RecognitionEvent::Failed { error, .. } = &mut event {
            *error = redact_sensitive_data(error);
        }

        let entry = EventLogEntry {
            run_id: run_id.into(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "recognition_events", event = %json, "Recognition event"),
            Err(e) => info!(target: "recognition_events", error = %e, "Unserializable recognition event"),
        }
        entry
    }
}
