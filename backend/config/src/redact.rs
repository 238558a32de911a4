//! Config redaction: masks credentials so a config can be printed or logged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "key",
    "token",
    "accessToken",
    "access_token",
    "secret",
    "password",
];

/// Google API keys have a fixed shape; mask them wherever they appear.
static GOOGLE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AIza[0-9A-Za-z_\-]{35}$").expect("valid regex"));

/// Replace sensitive values with a four-character hint followed by `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if !s.is_empty() && (is_sensitive_key(key) || GOOGLE_KEY_PATTERN.is_match(s)) => {
            Value::String(mask(s))
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of every value `redact` would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    fn walk(value: &Value, path: &str, key: &str, out: &mut Vec<String>) {
        match value {
            Value::String(s) if !s.is_empty() => {
                if is_sensitive_key(key) || GOOGLE_KEY_PATTERN.is_match(s) {
                    out.push(path.to_string());
                }
            }
            Value::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    walk(v, &format!("{path}[{i}]"), key, out);
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    let child = if path.is_empty() {
                        k.clone()
                    } else {
                        format!("{path}.{k}")
                    };
                    walk(v, &child, k, out);
                }
            }
            _ => {}
        }
    }
    let mut paths = Vec::new();
    walk(value, "", "", &mut paths);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key_field() {
        let v = json!({ "model": { "apiKey": "AIzaSyExampleExampleExample" } });
        let out = redact(&v);
        let key = out["model"]["apiKey"].as_str().unwrap();
        assert_eq!(key, "AIza***");
    }

    #[test]
    fn short_secret_is_fully_masked() {
        let out = redact(&json!({ "token": "abc" }));
        assert_eq!(out["token"], "***");
    }

    #[test]
    fn masks_google_key_under_any_name() {
        let leaked = format!("AIza{}", "x".repeat(35));
        let out = redact(&json!({ "prompt": leaked }));
        assert_eq!(out["prompt"], "AIza***");
    }

    #[test]
    fn leaves_models_alone() {
        let v = json!({ "model": { "visionModel": "gemini-1.5-flash" } });
        assert_eq!(redact(&v), v);
    }

    #[test]
    fn lists_redacted_paths() {
        let v = json!({ "model": { "apiKey": "k" }, "vision": { "apiKey": "" } });
        assert_eq!(collect_redacted_paths(&v), vec!["model.apiKey"]);
    }
}
