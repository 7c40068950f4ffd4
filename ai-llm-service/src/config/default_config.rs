//! Default LLM configs loaded from environment variables.
//!
//! Two entry points:
//!
//! - [`config_from_env`] → startup config (Groq-first, OpenAI variables as fallback)
//! - [`config_for_provider`] → config for a provider/model pair chosen at runtime
//!   (the editor settings screen)
//!
//! # Environment variables
//!
//! Groq (default provider):
//! - `GROQ_API_KEY`  (fallback `OPENAI_API_KEY`)
//! - `GROQ_MODEL`    (fallback `OPENAI_MODEL`, default `llama-3.3-70b-versatile`)
//! - `GROQ_BASE_URL` (fallback `OPENAI_BASE_URL`, default `https://api.groq.com/openai/v1`)
//!
//! OpenAI:
//! - `OPENAI_API_KEY`
//! - `OPENAI_BASE_URL` (default `https://api.openai.com/v1`)
//!
//! Common:
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64, default 60)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, env_opt_u64, validate_http_endpoint},
};

/// Builds the startup config strictly from the process environment.
///
/// # Errors
/// - [`crate::error_handler::ConfigError::InvalidNumber`] if `LLM_TIMEOUT_SECS` is not a `u64`
/// - [`crate::error_handler::ConfigError::InvalidFormat`] if the base URL is not http(s)
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let mut cfg = startup_config_with(env_lookup);
    validate_http_endpoint("GROQ_BASE_URL", &cfg.endpoint)?;
    cfg.timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?;
    Ok(cfg)
}

/// Builds a config for an explicitly selected provider and model.
///
/// A blank `model_key` keeps the provider's default model. Unknown provider
/// keys resolve to Groq, same as [`LlmProvider::from_key`].
pub fn config_for_provider(
    provider_key: &str,
    model_key: &str,
    timeout_secs: Option<u64>,
) -> LlmModelConfig {
    let mut cfg = provider_config_with(env_lookup, provider_key, model_key);
    cfg.timeout_secs = timeout_secs;
    cfg
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// First non-blank (trimmed) value among `keys` using `lookup`.
fn first_non_empty_env<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

pub(crate) fn startup_config_with<F>(lookup: F) -> LlmModelConfig
where
    F: Fn(&str) -> Option<String>,
{
    let provider = LlmProvider::Groq;
    let model = first_non_empty_env(&lookup, &["GROQ_MODEL", "OPENAI_MODEL"])
        .unwrap_or_else(|| provider.default_model().to_string());
    let endpoint = first_non_empty_env(&lookup, &["GROQ_BASE_URL", "OPENAI_BASE_URL"])
        .unwrap_or_else(|| provider.default_base_url().to_string());
    let api_key = first_non_empty_env(&lookup, &["GROQ_API_KEY", "OPENAI_API_KEY"]);

    LlmModelConfig::new(provider, model, endpoint, api_key)
}

pub(crate) fn provider_config_with<F>(
    lookup: F,
    provider_key: &str,
    model_key: &str,
) -> LlmModelConfig
where
    F: Fn(&str) -> Option<String>,
{
    let provider = LlmProvider::from_key(provider_key);
    let model = match model_key.trim() {
        "" => provider.default_model().to_string(),
        m => m.to_string(),
    };

    let (api_key, endpoint) = match provider {
        LlmProvider::OpenAI => (
            first_non_empty_env(&lookup, &["OPENAI_API_KEY"]),
            first_non_empty_env(&lookup, &["OPENAI_BASE_URL"]),
        ),
        LlmProvider::Groq => (
            first_non_empty_env(&lookup, &["GROQ_API_KEY", "OPENAI_API_KEY"]),
            first_non_empty_env(&lookup, &["GROQ_BASE_URL", "OPENAI_BASE_URL"]),
        ),
    };
    let endpoint = endpoint.unwrap_or_else(|| provider.default_base_url().to_string());

    LlmModelConfig::new(provider, model, endpoint, api_key)
}
