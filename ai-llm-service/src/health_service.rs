//! Health check for the active chat-completion backend.
//!
//! Request: `GET {endpoint}/models` with bearer auth, then a best-effort check
//! that the configured model is listed. Works for OpenAI and Groq alike.
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to `ok=false`).

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Provider key (`groq` / `openai`).
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the pipeline is configured to use.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the check.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: cfg.provider.as_key().to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// A health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds, default 10).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self { client })
    }

    /// Checks a config. Never returns an error: failures become `ok = false`.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_check(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %status.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health check completed"
                );
                status
            }
            Err(err) => {
                let elapsed = start.elapsed().as_millis();
                let status = HealthStatus::new(cfg, false, elapsed, err.to_string());
                warn!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    message = %status.message,
                    "health check failed"
                );
                status
            }
        }
    }

    async fn try_check(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let api_key = cfg
            .api_key
            .as_deref()
            .ok_or(HealthError::MissingApiKey(cfg.provider.as_key()))?;

        let url = format!("{}/models", endpoint.trim_end_matches('/'));
        debug!(provider = cfg.provider.as_key(), model = %cfg.model, "GET {}", url);

        let start = Instant::now();
        let resp = self.client.get(&url).bearer_auth(api_key).send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        // Expected minimal JSON: { "data": [ { "id": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        let status = match resp.json::<Models>().await {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => {
                HealthStatus::new(cfg, true, latency, "provider is healthy; model is available")
            }
            Ok(_) => HealthStatus::new(
                cfg,
                false,
                latency,
                "provider is up, but model not found in /models",
            ),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("provider is reachable; failed to decode /models: {e}"),
            ),
        };
        Ok(status)
    }
}
