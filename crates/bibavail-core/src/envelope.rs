//! Defensive accessors over the raw availability envelope.
//!
//! The ILS translates XML to JSON on its side and collapses any one-element
//! list to a bare object or scalar. Every "list" position in the envelope
//! (bibs, datafields, subfields) must therefore be re-normalized to a list
//! independently before iterating.

use serde_json::Value;

/// Normalize a value that should be a list.
///
/// Absent and `null` values are an empty list, an array is itself, and
/// anything else is a one-element list.
pub fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Extract a scalar as a string, accepting the number/bool forms the
/// XML-to-JSON translation sometimes produces for numeric subfields.
pub fn content_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Subfield text content. The upstream uses `__content__` (its XML
/// translation convention); plain `content` is accepted as a fallback.
pub fn subfield_content(subfield: &Value) -> Option<String> {
    subfield
        .get("__content__")
        .or_else(|| subfield.get("content"))
        .and_then(content_string)
}

/// The `web_service_result` payload, present only on error envelopes.
pub fn web_service_result(envelope: &Value) -> Option<&Value> {
    envelope.get("web_service_result")
}
