//! Resolves `LLM_PROVIDER` and the model overrides to a base URL and model id.

use std::fmt;

use tracing::warn;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.1-70b-instruct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenRouter,
}

impl Provider {
    /// Resolves a configured name. Unknown names fall back to OpenRouter so a
    /// typo in `LLM_PROVIDER` degrades to the default profile instead of
    /// taking the pipeline down.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Provider::Groq,
            "openrouter" => Provider::OpenRouter,
            other => {
                warn!("Unrecognized LLM provider '{other}', falling back to openrouter");
                Provider::OpenRouter
            }
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Provider::Groq => GROQ_BASE_URL,
            Provider::OpenRouter => OPENROUTER_BASE_URL,
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => DEFAULT_GROQ_MODEL,
            Provider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => f.write_str("GROQ"),
            Provider::OpenRouter => f.write_str("OPENROUTER"),
        }
    }
}

/// Per-provider model overrides from configuration.
#[derive(Debug, Clone, Default)]
pub struct ModelOverrides {
    pub groq: Option<String>,
    pub openrouter: Option<String>,
}

/// Immutable endpoint/model pair used for a completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
}

impl ProviderSelection {
    pub fn resolve(provider_name: &str, overrides: &ModelOverrides) -> Self {
        let provider = Provider::from_name(provider_name);
        let override_model = match provider {
            Provider::Groq => overrides.groq.as_deref(),
            Provider::OpenRouter => overrides.openrouter.as_deref(),
        };
        let model = override_model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(provider.default_model());

        Self {
            provider,
            base_url: provider.base_url().to_string(),
            model: model.to_string(),
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_uses_groq_profile() {
        let selection = ProviderSelection::resolve("groq", &ModelOverrides::default());
        assert_eq!(selection.provider, Provider::Groq);
        assert_eq!(selection.base_url, GROQ_BASE_URL);
        assert_eq!(selection.model, DEFAULT_GROQ_MODEL);
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        let selection = ProviderSelection::resolve("  GROQ ", &ModelOverrides::default());
        assert_eq!(selection.provider, Provider::Groq);
    }

    #[test]
    fn test_openrouter_is_default_profile() {
        let selection = ProviderSelection::resolve("openrouter", &ModelOverrides::default());
        assert_eq!(selection.base_url, OPENROUTER_BASE_URL);
        assert_eq!(selection.model, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn test_unknown_provider_falls_back_to_openrouter() {
        let selection = ProviderSelection::resolve("grok", &ModelOverrides::default());
        assert_eq!(selection.provider, Provider::OpenRouter);
        assert_eq!(selection.base_url, OPENROUTER_BASE_URL);
    }

    #[test]
    fn test_model_override_applies_only_to_selected_provider() {
        let overrides = ModelOverrides {
            groq: Some("llama-3.3-70b-versatile".to_string()),
            openrouter: Some("mistralai/mixtral-8x7b".to_string()),
        };
        assert_eq!(
            ProviderSelection::resolve("groq", &overrides).model,
            "llama-3.3-70b-versatile"
        );
        assert_eq!(
            ProviderSelection::resolve("openrouter", &overrides).model,
            "mistralai/mixtral-8x7b"
        );
    }

    #[test]
    fn test_blank_override_keeps_default_model() {
        let overrides = ModelOverrides {
            groq: Some("   ".to_string()),
            openrouter: None,
        };
        assert_eq!(
            ProviderSelection::resolve("groq", &overrides).model,
            DEFAULT_GROQ_MODEL
        );
    }

    #[test]
    fn test_completions_url() {
        let selection = ProviderSelection::resolve("groq", &ModelOverrides::default());
        assert_eq!(
            selection.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }
}
