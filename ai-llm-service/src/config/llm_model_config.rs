use crate::config::llm_provider::LlmProvider;

/// Configuration for an OpenAI-compatible chat-completion backend.
///
/// Sampling knobs (`temperature`, `max_tokens`) are per call and live in
/// [`crate::services::open_ai_service::CompletionRequest`], because every
/// pipeline stage uses its own values.
///
/// # Fields
///
/// - `provider`: which backend (Groq or OpenAI).
/// - `model`: model identifier (e.g. `"llama-3.3-70b-versatile"`).
/// - `endpoint`: API base including the version segment (e.g. `https://api.openai.com/v1`).
/// - `api_key`: bearer token; calls fail fast when it is absent.
/// - `timeout_secs`: optional request timeout in seconds (60 when unset).
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::OpenAI,
///     model: "gpt-4o-mini".to_string(),
///     endpoint: "https://api.openai.com/v1".to_string(),
///     api_key: Some("sk-...".to_string()),
///     timeout_secs: Some(30),
/// };
/// assert!(cfg.json_mode_supported());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// The backend (Groq or OpenAI).
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// API base URL, without trailing slash.
    pub endpoint: String,

    /// Optional API key for bearer authentication.
    pub api_key: Option<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Builds a config from parts, trimming the endpoint's trailing slashes.
    pub fn new(
        provider: LlmProvider,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            provider,
            model: model.into(),
            endpoint: endpoint.trim().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout_secs: None,
        }
    }

    /// Whether `response_format: {"type":"json_object"}` should be requested.
    ///
    /// Groq (by provider or by endpoint host) is asked for plain output and
    /// the response is salvaged client-side instead.
    pub fn json_mode_supported(&self) -> bool {
        if self.provider == LlmProvider::Groq {
            return false;
        }
        !self.endpoint.trim().to_lowercase().contains("groq")
    }

    /// True when a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}
