//! Ready-made payload renderers for [`crate::PayloadBuilder::message_with`]

use crate::error::Result;
use crate::record::Payload;
use serde_json::Value;

/// Compact JSON object
pub fn to_json(payload: &Payload) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Indented JSON object
pub fn to_json_pretty(payload: &Payload) -> Result<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Space separated `key=value` pairs in key order.
///
/// Strings are written bare unless they contain whitespace, `=`, or `"`, in
/// which case they are JSON quoted. Other values use their JSON text.
pub fn to_key_value_line(payload: &Payload) -> String {
    let mut keys: Vec<&String> = payload.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| format!("{}={}", bare_or_quoted(key), render_value(&payload[key])))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => bare_or_quoted(s),
        other => other.to_string(),
    }
}

fn bare_or_quoted(text: &str) -> String {
    let needs_quotes =
        text.is_empty() || text.chars().any(|c| c.is_whitespace() || c == '=' || c == '"');
    if needs_quotes {
        Value::String(text.to_string()).to_string()
    } else {
        text.to_string()
    }
}
