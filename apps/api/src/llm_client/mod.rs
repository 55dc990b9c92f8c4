/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Screening stages build a [`CompletionPrompt`] and hand it to the
/// [`CallExecutor`], which owns key selection, rotation and retry.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod classify;
pub mod executor;
pub mod extract;
pub mod key_pool;
pub mod prompts;
pub mod provider;

pub use executor::{CallExecutor, CompletionPrompt, ResponseShape};
pub use extract::StructuredResult;
pub use key_pool::KeyPool;
pub use provider::{ModelOverrides, ProviderSelection};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Sends one chat-completion request and returns the assistant text.
///
/// Carried by the executor as `Arc<dyn CompletionTransport>` so tests can
/// script provider behaviour without a network.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        selection: &ProviderSelection,
        api_key: &str,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<String, LlmError>;
}

/// reqwest-backed transport for OpenAI-compatible endpoints (Groq, OpenRouter).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
}

impl LlmClient {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl CompletionTransport for LlmClient {
    async fn complete(
        &self,
        selection: &ProviderSelection,
        api_key: &str,
        request: &ChatCompletionRequest<'_>,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(selection.completions_url())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                warn!("LLM API returned {}: {}", status, body);
            }
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_error_message(body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(transport_error)?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        completion
            .into_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

fn transport_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(err)
    }
}

/// Pulls `error.message` (and `error.code`, when present) out of an
/// OpenAI-style error body; falls back to the raw body.
fn provider_error_message(body: String) -> String {
    match serde_json::from_str::<ProviderError>(&body) {
        Ok(parsed) => match parsed.error.code {
            Some(serde_json::Value::String(code)) => {
                format!("{} (code: {code})", parsed.error.message)
            }
            Some(serde_json::Value::Number(code)) => {
                format!("{} (code: {code})", parsed.error.message)
            }
            _ => parsed.error.message,
        },
        Err(_) => body,
    }
}
