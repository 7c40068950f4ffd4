//! Shared LLM service whose provider/model can be switched at runtime.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Keeps one HTTP client for the active config and rebuilds it only when
//!   the provider, endpoint, model, key or timeout actually changed.
//! - In-flight calls keep the client they started with.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::active_provider::LlmService;
//! use ai_llm_service::config::default_config::config_from_env;
//! use ai_llm_service::services::open_ai_service::CompletionRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let svc = Arc::new(LlmService::new(config_from_env()?, Some(10))?);
//!
//!     svc.apply_settings("openai", "gpt-4o-mini").await?;
//!
//!     let req = CompletionRequest::new("demo", "Answer in JSON.", "{\"ping\":true}");
//!     let json = svc.complete_json(&req).await?;
//!     println!("{json}");
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::{
    config::{default_config::config_for_provider, llm_model_config::LlmModelConfig},
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::open_ai_service::{CompletionRequest, OpenAiService},
};

/// Shared handle to the active chat-completion client.
pub struct LlmService {
    current: RwLock<Arc<OpenAiService>>,
    health: HealthService,
}

impl LlmService {
    /// Creates the service with an initial config.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the client or the health checker cannot be built.
    pub fn new(cfg: LlmModelConfig, health_timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        Ok(Self {
            current: RwLock::new(Arc::new(OpenAiService::new(cfg)?)),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// The client used by calls started from now on.
    pub async fn current(&self) -> Arc<OpenAiService> {
        self.current.read().await.clone()
    }

    /// Snapshot of the active config.
    pub async fn config(&self) -> LlmModelConfig {
        self.current.read().await.config().clone()
    }

    /// Switches to `provider_key`/`model_key`, resolving keys and base URLs
    /// from the environment. The current timeout is kept.
    ///
    /// Returns `true` when a new client was built.
    pub async fn apply_settings(
        &self,
        provider_key: &str,
        model_key: &str,
    ) -> Result<bool, AiLlmError> {
        let timeout_secs = self.current.read().await.config().timeout_secs;
        let cfg = config_for_provider(provider_key, model_key, timeout_secs);
        self.apply_config(cfg).await
    }

    /// Replaces the active config; a no-op when nothing changed.
    pub async fn apply_config(&self, cfg: LlmModelConfig) -> Result<bool, AiLlmError> {
        if self.current.read().await.config() == &cfg {
            return Ok(false);
        }

        let mut guard = self.current.write().await;
        if guard.config() == &cfg {
            return Ok(false);
        }

        info!(
            from_provider = guard.config().provider.as_key(),
            from_model = %guard.config().model,
            to_provider = cfg.provider.as_key(),
            to_model = %cfg.model,
            "switching chat-completion provider"
        );
        *guard = Arc::new(OpenAiService::new(cfg)?);
        Ok(true)
    }

    /// Plain-text completion with the active client.
    pub async fn complete(&self, req: &CompletionRequest<'_>) -> Result<String, AiLlmError> {
        self.current().await.complete(req).await
    }

    /// JSON completion (with JSON-mode degradation) with the active client.
    pub async fn complete_json(&self, req: &CompletionRequest<'_>) -> Result<String, AiLlmError> {
        self.current().await.complete_json(req).await
    }

    /// Health snapshot of the active config.
    pub async fn health(&self) -> HealthStatus {
        let cfg = self.config().await;
        self.health.check(&cfg).await
    }
}
