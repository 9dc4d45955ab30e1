//! Decode error taxonomy.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by envelope decoding.
///
/// Neither variant is retryable: both describe a well-formed upstream
/// rejection or an envelope that will not change on re-request.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The envelope carried a `web_service_result` error payload instead
    /// of availability data. `detail` is the upstream `errorList` carried
    /// verbatim - its shape is an uncontrolled external format (sometimes
    /// a map, possibly a list) and must be forwarded, not re-interpreted.
    #[error("upstream service error: {message}")]
    Upstream { message: String, detail: Value },

    /// The envelope has no `bibs` structure to decode.
    #[error("availability envelope has no bibs entry")]
    MalformedEnvelope,
}

/// Derive a human-readable message from an upstream `errorList` payload.
///
/// Handles the documented map shape (`errorList.error.errorCode` /
/// `errorMessage`), a list of such errors, and anything else by falling
/// back to the raw JSON text.
pub fn upstream_message(detail: &Value) -> String {
    if let Some(msg) = first_error_message(detail) {
        return msg;
    }
    match detail {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown error from availability service".to_string(),
        other => other.to_string(),
    }
}

fn first_error_message(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(inner) = map.get("error") {
                return first_error_message(inner);
            }
            let code = map.get("errorCode").and_then(Value::as_str);
            let message = map
                .get("errorMessage")
                .and_then(Value::as_str)
                .map(str::trim);
            match (code, message) {
                (Some(c), Some(m)) if !m.is_empty() => Some(format!("{}: {}", c, m)),
                (Some(c), _) => Some(c.to_string()),
                (None, Some(m)) if !m.is_empty() => Some(m.to_string()),
                _ => None,
            }
        }
        Value::Array(items) => items.iter().find_map(first_error_message),
        _ => None,
    }
}
