//! Failure classification for completion calls.
//!
//! Only transient failures are worth burning an attempt and a key on; every
//! other failure is surfaced immediately.

use crate::llm_client::LlmError;

/// Substrings (matched against the lowercased error text) that mark a
/// provider-side rate limit.
const RATE_LIMIT_MARKERS: &[&str] = &["rate_limit", "rate limit", "too many requests", "429"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited,
    TimedOut,
    Permanent,
}

impl FailureClass {
    /// Transient failures rotate to the next key and retry.
    pub fn is_transient(self) -> bool {
        matches!(self, FailureClass::RateLimited | FailureClass::TimedOut)
    }
}

pub fn classify(error: &LlmError) -> FailureClass {
    match error {
        LlmError::Api { status: 429, .. } => FailureClass::RateLimited,
        LlmError::Timeout => FailureClass::TimedOut,
        other => {
            let text = other.to_string().to_lowercase();
            if RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker)) {
                FailureClass::RateLimited
            } else {
                FailureClass::Permanent
            }
        }
    }
}
