//! Structured-data extraction from free-form model responses.
//!
//! Models wrap JSON in prose or markdown fences. These helpers locate the
//! outermost object (or array) and parse it, returning `None` when nothing
//! parses so callers can apply their own static fallback.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the first parseable JSON object from a response.
///
/// # Examples
///
/// ```
/// use council_domain::core::json::extract_json_object;
///
/// let text = "Here you go:\n```json\n{\"complexity\": 7}\n```";
/// let value = extract_json_object(text).unwrap();
/// assert_eq!(value["complexity"], 7);
///
/// assert!(extract_json_object("no structure here").is_none());
/// ```
pub fn extract_json_object(response: &str) -> Option<Value> {
    extract_delimited(response, '{', '}').filter(Value::is_object)
}

/// Extract the first parseable JSON array from a response.
pub fn extract_json_array(response: &str) -> Option<Value> {
    extract_delimited(response, '[', ']').filter(Value::is_array)
}

/// Parse the first JSON object in the response into `T`.
pub fn parse_json_object<T: DeserializeOwned>(response: &str) -> Option<T> {
    extract_json_object(response).and_then(|v| serde_json::from_value(v).ok())
}

fn extract_delimited(response: &str, open: char, close: char) -> Option<Value> {
    let body = strip_code_fence(response);

    // Widest span first, then shrink the end until something parses.
    let start = body.find(open)?;
    let mut end = body.rfind(close)?;
    while end > start {
        let candidate = &body[start..=end];
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some(value);
        }
        match body[start..end].rfind(close) {
            Some(prev) => end = start + prev,
            None => break,
        }
    }
    None
}

fn strip_code_fence(response: &str) -> &str {
    if let Some(fence_start) = response.find("```") {
        let after = &response[fence_start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(fence_end) = after.find("```") {
            return &after[..fence_end];
        }
    }
    response
}

/// Read a string array field, tolerating a single string value.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Read a numeric field that may have been emitted as a string.
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

/// Read a boolean field that may have been emitted as a string.
pub fn bool_field(value: &Value, key: &str) -> Option<bool> {
    match value.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "continue" => Some(true),
            "false" | "no" | "stop" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
