//! Unified error handling for `ai-llm-service`.
//!
//! This module exposes a single top-level error type [`AiLlmError`] for the whole
//! library, and groups domain-specific errors in nested enums ([`ConfigError`],
//! [`ProviderError`], [`HealthError`]). Small helpers for reading environment
//! variables and classifying upstream API failures live here too.
//!
//! All messages include the suffix `[AI LLM Service]` to simplify attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiLlmError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiLlmError {
    /// Configuration/validation errors (startup or settings switch).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Chat-completion provider failures (HTTP status, decode, empty output).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Health-check/connectivity/decoding errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[AI LLM Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// The model kept answering with something that is not a JSON object.
    #[error("[AI LLM Service] {step}: model did not return valid json")]
    InvalidJson {
        /// Pipeline step label used in logs (e.g. `extract-facts`).
        step: String,
    },
}

impl AiLlmError {
    /// Message reported by the upstream API for non-success responses.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::Api(api),
                ..
            }) => Some(api.message.as_str()),
            _ => None,
        }
    }

    /// HTTP status of a failed upstream call, if any.
    pub fn api_status(&self) -> Option<StatusCode> {
        match self {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::Api(api),
                ..
            }) => Some(api.status),
            _ => None,
        }
    }

    /// True when the provider rejected the call because the prompt is too big
    /// (payload limit, TPM budget or context window).
    pub fn is_request_too_large(&self) -> bool {
        self.api_message().is_some_and(is_request_too_large_message)
    }

    /// True when the provider could not honour `response_format: json_object`.
    pub fn is_json_mode_rejection(&self) -> bool {
        self.api_message().is_some_and(is_json_mode_rejection_message)
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (like timeouts).
    #[error("[AI LLM Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `LLM_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI LLM Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable or field name (e.g., `GROQ_BASE_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },
}

/* ------------------------------------------------------------------------- */
/* Provider errors                                                           */
/* ------------------------------------------------------------------------- */

/// Provider label attached to [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAI,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Groq => f.write_str("groq"),
            Provider::OpenAI => f.write_str("openai"),
        }
    }
}

/// A failed chat-completion call, tagged with the provider that produced it.
#[derive(Debug, Error)]
#[error("[AI LLM Service] {provider}: {kind}")]
pub struct ProviderError {
    pub provider: Provider,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: Provider, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }
}

/// What went wrong with the provider call.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderErrorKind {
    /// No API key configured for the active provider.
    #[error("api key is missing (set GROQ_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,

    /// The endpoint is empty or does not start with http/https.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a status >= 400.
    #[error("{0}")]
    Api(ApiError),

    /// Response payload could not be decoded as expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Response decoded, but `choices` was empty.
    #[error("returned no choices")]
    EmptyChoices,
}

/// Non-success response with the message extracted from the body.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request failed ({}): {}",
            self.status.as_u16(),
            self.message
        )
    }
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for provider health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// The endpoint is empty or does not start with http/https.
    #[error("[AI LLM Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI LLM Service] HTTP {} from {}: {}", .0.status, .0.url, .0.snippet)]
    HttpStatus(HttpError),

    /// The active config has no API key to check with.
    #[error("[AI LLM Service] missing API key for {0}")]
    MissingApiKey(&'static str),
}

/// Status/URL/body-snippet triple for failed health checks.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    pub snippet: String,
}

/* ------------------------------------------------------------------------- */
/* Upstream message helpers                                                  */
/* ------------------------------------------------------------------------- */

/// Returns a short, single-line snippet of a response body for logs.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 300;
    let one_line = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if one_line.chars().count() <= MAX {
        one_line
    } else {
        let cut: String = one_line.chars().take(MAX).collect();
        format!("{cut}…")
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Lookup order: `error.message` (object form), `error` (string form),
/// top-level `message`, and finally the raw body.
pub fn extract_error_message(body: &str) -> String {
    let Ok(payload) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    if let Some(error) = payload.get("error") {
        match error {
            serde_json::Value::Object(obj) => {
                if let Some(msg) = obj.get("message").and_then(|m| m.as_str()) {
                    if !msg.trim().is_empty() {
                        return msg.to_string();
                    }
                }
            }
            serde_json::Value::String(msg) if !msg.trim().is_empty() => {
                return msg.clone();
            }
            _ => {}
        }
    }

    if let Some(msg) = payload.get("message").and_then(|m| m.as_str()) {
        if !msg.trim().is_empty() {
            return msg.to_string();
        }
    }

    body.to_string()
}

/// Heuristic match for "prompt too big" rejections across providers.
pub fn is_request_too_large_message(message: &str) -> bool {
    let lower = message.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }

    lower.contains("request too large")
        || lower.contains("reduce your message size")
        || (lower.contains("tokens per minute") && lower.contains("requested"))
        || lower.contains("context length")
}

/// Heuristic match for providers that refuse or fail JSON-mode output.
pub fn is_json_mode_rejection_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("response_format")
        || lower.contains("json_object")
        || lower.contains("failed to generate json")
        || lower.contains("failed_generation")
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidNumber`] if the
/// variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<u64>().map(Some).map_err(|_| {
            AiLlmError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        _ => Ok(None),
    }
}

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`AiLlmError::Config`] with [`ConfigError::InvalidFormat`] when
/// the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}
