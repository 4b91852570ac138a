//! Lenient parsing of model completions into recommendations.
//!
//! The whole completion fails only when no JSON object can be recovered.
//! Inside a recovered object, malformed entries are dropped one by one.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::error::RagError;
use crate::models::Recommendation;

/// Greedy span from the first `{` to the last `}`.
fn json_span_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("Invalid JSON span regex"))
}

/// Removes a surrounding code fence and its language tag, if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    let rest = match rest.find('\n') {
        Some(pos) if !rest[..pos].contains('{') => &rest[pos + 1..],
        _ => rest,
    };

    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Pulls the JSON-looking span out of a completion.
pub fn extract_json_block(raw: &str) -> Result<&str, RagError> {
    let text = strip_code_fence(raw.trim());
    json_span_regex()
        .find(text)
        .map(|m| m.as_str())
        .ok_or_else(|| RagError::MalformedOutput("response did not contain JSON".to_string()))
}

/// Parses a completion into recommendations, preserving order and duplicates.
pub fn parse_recommendations(raw: &str) -> Result<Vec<Recommendation>, RagError> {
    let block = extract_json_block(raw)?;
    let payload: Value = serde_json::from_str(block)
        .map_err(|e| RagError::MalformedOutput(format!("invalid JSON: {}", e)))?;

    let Some(entries) = payload.get("items").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut recommendations = Vec::with_capacity(entries.len());
    for entry in entries {
        match parse_entry(entry) {
            Some(rec) => recommendations.push(rec),
            None => tracing::debug!("Dropping malformed recommendation entry: {}", entry),
        }
    }
    Ok(recommendations)
}

fn parse_entry(entry: &Value) -> Option<Recommendation> {
    let item_id = coerce_string(entry.get("itemId")?)?;
    let reason = coerce_string(entry.get("reason")?)?;
    let score = match entry.get("score") {
        None | Some(Value::Null) => 0.0,
        Some(value) => coerce_f64(value)?,
    };

    Some(Recommendation {
        item_id,
        reason,
        score,
    })
}

/// `null` counts as absent; other scalars are stringified.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
