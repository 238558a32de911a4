//! Structured logging for wordbot.
//!
//! Console output, an optional daily-rotated JSON file, credential scrubbing,
//! and the recognition event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, RecognitionEvent};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
