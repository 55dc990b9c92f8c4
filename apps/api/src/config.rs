use anyhow::{Context, Result};
use secrecy::SecretString;

use crate::llm_client::executor::DEFAULT_MAX_ATTEMPTS;
use crate::llm_client::ModelOverrides;

/// Numbered credential slots run `GROQ_API_KEY_1` ..= `GROQ_API_KEY_9`.
const KEY_SLOTS: std::ops::RangeInclusive<u8> = 1..=9;
const LEGACY_KEY_VAR: &str = "GROQ_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Application configuration loaded from environment variables.
/// Missing credentials are not fatal here; they surface on the first call.
#[derive(Debug)]
pub struct Config {
    pub api_keys: Vec<SecretString>,
    pub llm_provider: String,
    pub models: ModelOverrides,
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            api_keys: load_api_keys(&non_empty),
            llm_provider: non_empty("LLM_PROVIDER").unwrap_or_else(|| "openrouter".to_string()),
            models: ModelOverrides {
                groq: non_empty("GROQ_MODEL"),
                openrouter: non_empty("OPENROUTER_MODEL"),
            },
            max_attempts: parse_or("LLM_MAX_ATTEMPTS", non_empty("LLM_MAX_ATTEMPTS"), DEFAULT_MAX_ATTEMPTS)?,
            request_timeout_secs: parse_or(
                "LLM_TIMEOUT_SECS",
                non_empty("LLM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            port: parse_or("PORT", non_empty("PORT"), 8080)?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Numbered slots in order; the legacy single slot only when none are set.
fn load_api_keys(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<SecretString> {
    let mut keys: Vec<SecretString> = KEY_SLOTS
        .filter_map(|slot| lookup(&format!("{LEGACY_KEY_VAR}_{slot}")))
        .map(SecretString::from)
        .collect();

    if keys.is_empty() {
        keys.extend(lookup(LEGACY_KEY_VAR).map(SecretString::from));
    }
    keys
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}
