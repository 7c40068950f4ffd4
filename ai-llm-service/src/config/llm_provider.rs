use crate::error_handler::Provider;

/// Default model for Groq's OpenAI-compatible API.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
/// Default base URL (including `/v1`) for Groq.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default model for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
/// Default base URL (including `/v1`) for OpenAI.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Represents the OpenAI-compatible backend used for chat completions.
///
/// Both providers speak the same `/chat/completions` protocol; they differ in
/// defaults, env variables and whether `response_format: json_object` is
/// worth asking for.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// assert_eq!(LlmProvider::from_key(" OpenAI "), LlmProvider::OpenAI);
/// assert_eq!(LlmProvider::from_key("anything-else"), LlmProvider::Groq);
/// assert_eq!(LlmProvider::Groq.as_key(), "groq");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LlmProvider {
    /// Groq cloud (default).
    #[default]
    Groq,
    /// OpenAI's ChatGPT API.
    OpenAI,
}

impl LlmProvider {
    /// Every selectable provider, in settings-screen order.
    pub const ALL: [LlmProvider; 2] = [LlmProvider::Groq, LlmProvider::OpenAI];

    /// Parses a settings key. Unknown keys fall back to Groq.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "openai" => LlmProvider::OpenAI,
            _ => LlmProvider::Groq,
        }
    }

    /// Stable settings key (`groq` / `openai`).
    pub fn as_key(self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAI => "openai",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LlmProvider::Groq => "Groq",
            LlmProvider::OpenAI => "OpenAI",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Groq => DEFAULT_GROQ_MODEL,
            LlmProvider::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Groq => DEFAULT_GROQ_BASE_URL,
            LlmProvider::OpenAI => DEFAULT_OPENAI_BASE_URL,
        }
    }

    /// Label used inside [`crate::error_handler::ProviderError`].
    pub fn error_label(self) -> Provider {
        match self {
            LlmProvider::Groq => Provider::Groq,
            LlmProvider::OpenAI => Provider::OpenAI,
        }
    }
}
