//! Text clean-up applied after a backend replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use wordbot_core::RecognitionMode;

static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every run of whitespace to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Drop everything but ASCII letters and whitespace, then normalize.
pub fn clean_letters(text: &str) -> String {
    normalize_whitespace(&NON_LETTER.replace_all(text, ""))
}

pub fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Keep only what `mode` asks for. Multi-word text is trimmed but keeps its
/// line breaks.
pub fn select(text: &str, mode: RecognitionMode) -> String {
    match mode {
        RecognitionMode::SingleWord => first_word(text).unwrap_or_default().to_string(),
        RecognitionMode::MultipleWords => text.trim().to_string(),
    }
}

/// Character-class counts of a final text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextSummary {
    pub chars: usize,
    pub words: usize,
    pub letters: usize,
    pub uppercase: usize,
    pub lowercase: usize,
    pub digits: usize,
    pub whitespace: usize,
    pub other: usize,
}

impl TextSummary {
    pub fn of(text: &str) -> Self {
        let mut summary = Self {
            words: text.split_whitespace().count(),
            ..Self::default()
        };
        for c in text.chars() {
            summary.chars += 1;
            if c.is_alphabetic() {
                summary.letters += 1;
                if c.is_uppercase() {
                    summary.uppercase += 1;
                } else if c.is_lowercase() {
                    summary.lowercase += 1;
                }
            } else if c.is_numeric() {
                summary.digits += 1;
            } else if c.is_whitespace() {
                summary.whitespace += 1;
            } else {
                summary.other += 1;
            }
        }
        summary
    }
}
