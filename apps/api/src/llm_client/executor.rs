//! Runs one completion call, moving to the next API key when the provider
//! rate-limits or times out.
//!
//! Algorithm per attempt (bounded by `max_attempts`):
//! 1. Read the current key. Empty pool or placeholder key → error, no retry.
//! 2. Build the chat request from the selected provider and the prompt.
//! 3. Send it and wait.
//! 4. Success → hand the text to the extractor; its result is final, even a
//!    JSON parse failure.
//! 5. Failure → classify. Transient with attempts left: rotate and go again.
//!    Transient on the last attempt: report exhaustion for that failure class.
//!    Permanent: fail now.

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{debug, error, info, warn};

use crate::llm_client::classify::{classify, FailureClass};
use crate::llm_client::extract::{extract, StructuredResult};
use crate::llm_client::key_pool::{is_placeholder_key, KeyPool};
use crate::llm_client::{ChatCompletionRequest, ChatMessage, CompletionTransport, ProviderSelection};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

pub const KEYS_EXHAUSTED: &str =
    "All API keys have hit rate limits. Please wait or add more keys.";

pub const ATTEMPTS_TIMED_OUT: &str =
    "All attempts timed out waiting for the LLM provider. Please try again later.";

/// Expected top-level fields of a stage payload. Used for diagnostics only.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShape {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Everything needed to build one chat request.
#[derive(Debug, Clone)]
pub struct CompletionPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub shape: ResponseShape,
}

pub struct CallExecutor {
    keys: Arc<KeyPool>,
    selection: ProviderSelection,
    transport: Arc<dyn CompletionTransport>,
}

impl CallExecutor {
    pub fn new(
        keys: Arc<KeyPool>,
        selection: ProviderSelection,
        transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            keys,
            selection,
            transport,
        }
    }

    pub fn selection(&self) -> &ProviderSelection {
        &self.selection
    }

    pub fn key_pool(&self) -> &KeyPool {
        &self.keys
    }

    pub async fn execute(&self, prompt: &CompletionPrompt, max_attempts: u32) -> StructuredResult {
        let provider = self.selection.provider;

        for attempt in 0..max_attempts {
            let key = match self.keys.current_key() {
                Ok(key) => key,
                Err(e) => {
                    error!("{provider} call aborted: {e}");
                    return StructuredResult::error(e.to_string());
                }
            };
            let key_number = self.keys.current_key_number();
            let total_keys = self.keys.total_keys();

            if is_placeholder_key(key.expose_secret()) {
                error!("{provider} API key #{key_number} is a placeholder");
                return StructuredResult::error(format!("{provider} API key not configured"));
            }

            info!(
                "Calling {} ({}) for {} with key #{}/{} (attempt {}/{})",
                provider,
                self.selection.model,
                prompt.shape.name,
                key_number,
                total_keys,
                attempt + 1,
                max_attempts
            );

            let request = ChatCompletionRequest {
                model: &self.selection.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: &prompt.system,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt.user,
                    },
                ],
                temperature: prompt.temperature,
            };

            let err = match self
                .transport
                .complete(&self.selection, key.expose_secret(), &request)
                .await
            {
                Ok(text) => {
                    info!("Received response: {} characters", text.chars().count());
                    let result = extract(&text);
                    log_missing_fields(&result, prompt.shape);
                    return result;
                }
                Err(err) => err,
            };

            let class = classify(&err);
            if !class.is_transient() {
                error!("API call failed on key #{key_number}: {err}");
                return StructuredResult::error(format!("API call failed: {err}"));
            }

            warn!("{class:?} on key #{key_number}/{total_keys}: {err}");
            if attempt + 1 < max_attempts {
                match self.keys.rotate() {
                    Ok(_) => info!("Retrying with key #{}", self.keys.current_key_number()),
                    Err(e) => error!("Key rotation failed before retry: {e}"),
                }
                continue;
            }

            return match class {
                FailureClass::TimedOut => {
                    error!("Last of {max_attempts} attempt(s) timed out");
                    StructuredResult::error(ATTEMPTS_TIMED_OUT)
                }
                _ => {
                    error!("All API keys exhausted after {max_attempts} attempt(s)");
                    StructuredResult::error(KEYS_EXHAUSTED)
                }
            };
        }

        StructuredResult::error("Failed after all retries")
    }
}

fn log_missing_fields(result: &StructuredResult, shape: ResponseShape) {
    if let StructuredResult::Success(payload) = result {
        let missing: Vec<&str> = shape
            .fields
            .iter()
            .copied()
            .filter(|field| !payload.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            debug!("{} response is missing fields: {:?}", shape.name, missing);
        }
    }
}
