//! Defensive field extraction for loosely-typed CRM responses
//!
//! The CRM returns IDs as numbers or strings depending on deployment, nests
//! relationships as objects or bare IDs, and renames wrapper keys between
//! versions. These helpers pick what they can and return `None` otherwise;
//! nothing here trusts a schema.

use serde_json::Value;

/// First non-empty string found under any of `keys`.
pub fn pick_str(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = value.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}

/// First integer found under any of `keys`, coercing numbers, numeric
/// strings, and `{id: ...}` relationship objects.
pub fn pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(found) = value.get(key).and_then(coerce_i64) {
            return Some(found);
        }
    }
    None
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Object(_) => value.get("id").and_then(coerce_i64),
        _ => None,
    }
}

/// Unwrap the record object from a possibly-enveloped response body.
/// Deployments wrap the resource as `{event: {...}}` or `{data: {...}}`;
/// others return it bare.
pub fn record_object(body: &Value) -> &Value {
    for key in ["event", "data"] {
        if let Some(inner) = body.get(key) {
            if inner.is_object() {
                return inner;
            }
        }
    }
    body
}

/// Items of a search response: `{contacts: [...]}`, `{matters: [...]}`,
/// `{data: [...]}`, or a bare array.
pub fn record_array<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Some(items) = body.as_array() {
        return Some(items);
    }
    for key in keys {
        if let Some(items) = body.get(key).and_then(Value::as_array) {
            return Some(items);
        }
    }
    body.get("data").and_then(Value::as_array)
}
