//! Scrubs credentials from strings before they are logged.

use once_cell::sync::Lazy;
use regex::Regex;

static QUERY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?&]key=)[^&\s]+").expect("valid regex"));
static GOOGLE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("valid regex"));
static KEY_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(x-goog-api-key\s*[:=]\s*)[^\s,;]+").expect("valid regex"));
static JSON_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)("api_?key"\s*:\s*")[^"]*"#).expect("valid regex"));

/// Redacts `key=` query parameters, `x-goog-api-key` headers, `apiKey` JSON
/// fields and bare Google API keys.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = QUERY_KEY_RE.replace_all(input, "${1}[REDACTED]");
    let redacted = KEY_HEADER_RE.replace_all(&redacted, "${1}[REDACTED]");
    let redacted = JSON_KEY_RE.replace_all(&redacted, "${1}[REDACTED]");
    GOOGLE_KEY_RE
        .replace_all(&redacted, "[REDACTED_KEY]")
        .into_owned()
}
