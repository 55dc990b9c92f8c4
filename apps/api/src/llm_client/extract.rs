//! Pulls the JSON object out of free-form model output.
//!
//! The payload is passed through untouched apart from the `status` tag; field
//! presence and types are the model's responsibility.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use tracing::{error, info};

/// Maximum number of characters of raw model output kept for diagnostics.
pub const RAW_SNIPPET_CHARS: usize = 500;

pub const NO_JSON_FOUND: &str = "Could not extract JSON from response";

/// Tagged outcome of one completion stage.
///
/// Serializes as the payload itself with `"status": "success"`, or as
/// `{"status": "error", "error": ..., "raw_response"?: ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    Success(Map<String, Value>),
    Error {
        error: String,
        raw_response: Option<String>,
    },
}

impl StructuredResult {
    pub fn error(message: impl Into<String>) -> Self {
        StructuredResult::Error {
            error: message.into(),
            raw_response: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StructuredResult::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            StructuredResult::Success(_) => None,
            StructuredResult::Error { error, .. } => Some(error),
        }
    }
}

impl Serialize for StructuredResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StructuredResult::Success(payload) => payload.serialize(serializer),
            StructuredResult::Error {
                error,
                raw_response,
            } => {
                let len = if raw_response.is_some() { 3 } else { 2 };
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("status", "error")?;
                map.serialize_entry("error", error)?;
                if let Some(raw) = raw_response {
                    map.serialize_entry("raw_response", raw)?;
                }
                map.end()
            }
        }
    }
}

/// Extracts the span from the first `{` to the last `}` and parses it.
pub fn extract(raw_text: &str) -> StructuredResult {
    let Some(span) = brace_span(raw_text) else {
        error!("No JSON found in response");
        return StructuredResult::error(NO_JSON_FOUND);
    };

    match serde_json::from_str::<Map<String, Value>>(span) {
        Ok(mut payload) => {
            payload.insert("status".to_string(), Value::String("success".to_string()));
            info!("Successfully parsed JSON response");
            StructuredResult::Success(payload)
        }
        Err(e) => {
            error!("JSON decode error: {e}");
            StructuredResult::Error {
                error: format!("JSON parsing failed: {e}"),
                raw_response: Some(raw_text.chars().take(RAW_SNIPPET_CHARS).collect()),
            }
        }
    }
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
