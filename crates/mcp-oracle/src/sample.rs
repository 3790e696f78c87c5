//! Bounding of sample responses sent to the oracle.
//!
//! Responses can be huge. Before classification, arrays are cut to their
//! first few elements, long strings are truncated, and the rendered sample
//! is capped to a character budget.

use serde_json::Value;

/// Arrays longer than this are cut down to this many elements.
pub const MAX_ARRAY_ITEMS: usize = 3;

/// Strings longer than this (in characters) are truncated.
pub const MAX_STRING_CHARS: usize = 500;

/// Marker appended to truncated strings.
pub const TRUNCATION_MARKER: &str = "...(truncated)";

/// Returns a copy of `value` with arrays and strings bounded.
///
/// # Examples
///
/// ```
/// use mcp_gateway_oracle::shrink_sample;
/// use serde_json::json;
///
/// let shrunk = shrink_sample(&json!({"items": [1, 2, 3, 4, 5]}));
/// assert_eq!(shrunk, json!({"items": [1, 2, 3]}));
/// ```
#[must_use]
pub fn shrink_sample(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .take(MAX_ARRAY_ITEMS)
                .map(shrink_sample)
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), shrink_sample(v)))
                .collect(),
        ),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let mut truncated: String = s.chars().take(MAX_STRING_CHARS).collect();
            truncated.push_str(TRUNCATION_MARKER);
            Value::String(truncated)
        }
        other => other.clone(),
    }
}

/// Shrinks and pretty-prints `value`, capped to `max_chars` characters.
#[must_use]
pub fn render_sample(value: &Value, max_chars: usize) -> String {
    let pretty = serde_json::to_string_pretty(&shrink_sample(value)).unwrap_or_default();
    match pretty.char_indices().nth(max_chars) {
        Some((cut, _)) => pretty[..cut].to_string(),
        None => pretty,
    }
}
