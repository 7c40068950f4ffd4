//! OpenAI-compatible chat-completion client (OpenAI, Groq, proxies).
//!
//! Minimal, non-streaming client around `POST {endpoint}/chat/completions`.
//! The endpoint already carries the version segment (e.g. `.../openai/v1`).
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//!
//! The API key is checked per call, so a client can exist before a key is
//! configured; calls then fail fast with `MissingApiKey` and never touch the
//! network.
//!
//! Errors are normalized via unified error types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        AiLlmError, ApiError, ProviderError, ProviderErrorKind, extract_error_message,
        make_snippet,
    },
    telemetry::preview_for_log,
};

/// Default client timeout when the config does not set one.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One chat-completion call: a system + user prompt pair and sampling knobs.
///
/// `step` is a short label (e.g. `extract-facts`) that tags every log line of
/// the call.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub step: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask for `response_format: {"type":"json_object"}`.
    pub json_mode: bool,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(step: &'a str, system: &'a str, user: &'a str) -> Self {
        Self {
            step,
            system,
            user,
            temperature: 0.2,
            max_tokens: 700,
            json_mode: false,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Thin client for an OpenAI-compatible chat API.
///
/// Constructed from a complete [`LlmModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let provider = cfg.provider.error_label();

        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ProviderError::new(
                provider,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_chat = format!("{}/chat/completions", endpoint.trim_end_matches('/'));

        info!(
            provider = cfg.provider.as_key(),
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            json_mode = cfg.json_mode_supported(),
            has_api_key = cfg.has_api_key(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// The config this client was built from.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Performs a **non-streaming** chat completion and returns the trimmed
    /// content of the first choice.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `MissingApiKey` when no key is configured
    /// - [`AiLlmError::Provider`] with `Api` for responses with status >= 400
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `EmptyChoices` if no choices are returned
    pub async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, AiLlmError> {
        let provider = self.cfg.provider.error_label();
        let api_key = self
            .cfg
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::new(provider, ProviderErrorKind::MissingApiKey))?;

        let started = Instant::now();
        let body = ChatCompletionRequest::from_request(&self.cfg, req);

        debug!(
            step = req.step,
            model = %self.cfg.model,
            provider = self.cfg.provider.as_key(),
            json_mode = req.json_mode,
            "POST {}", self.url_chat
        );
        debug!(step = req.step, "system prompt:\n{}", preview_for_log(req.system));
        debug!(step = req.step, "user prompt:\n{}", preview_for_log(req.user));

        let resp = self
            .client
            .post(&self.url_chat)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            let text = resp.text().await.unwrap_or_default();
            let message = extract_error_message(&text);

            error!(
                step = req.step,
                %status,
                snippet = %make_snippet(&text),
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned error status"
            );

            return Err(
                ProviderError::new(provider, ProviderErrorKind::Api(ApiError { status, message }))
                    .into(),
            );
        }

        let out: ChatCompletionResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    step = req.step,
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode chat completion response"
                );
                return Err(ProviderError::new(
                    provider,
                    ProviderErrorKind::Decode(format!(
                        "serde error: {e}; expected `choices[0].message.content`"
                    )),
                )
                .into());
            }
        };

        let content = out
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new(provider, ProviderErrorKind::EmptyChoices))?
            .message
            .content
            .unwrap_or_default()
            .trim()
            .to_string();

        debug!(step = req.step, "raw response:\n{}", preview_for_log(&content));
        info!(
            step = req.step,
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            response_chars = content.chars().count(),
            "chat completion completed"
        );

        Ok(content)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(cfg: &'a LlmModelConfig, req: &CompletionRequest<'a>) -> Self {
        Self {
            model: &cfg.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: req.system,
                },
                ChatMessage {
                    role: "user",
                    content: req.user,
                },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            response_format: req.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Minimal response for `/chat/completions`.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
