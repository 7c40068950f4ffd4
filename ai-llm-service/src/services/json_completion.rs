//! JSON-returning chat completions with graceful degradation.
//!
//! Providers disagree on JSON support: some reject `response_format`, some
//! accept it and then fail with `failed_generation`, and every model now and
//! then answers with chatter around (or instead of) the object. The policy:
//!
//! 1. request JSON-mode only when the config says the provider supports it;
//! 2. if the provider rejects JSON-mode, repeat the call once without it;
//! 3. salvage the first JSON object from the answer;
//! 4. if nothing salvageable came back, repeat once more without JSON-mode;
//! 5. still nothing → [`AiLlmError::InvalidJson`].

use tracing::warn;

use crate::{
    error_handler::AiLlmError,
    response_normalizer::normalize_json_content,
    services::open_ai_service::{CompletionRequest, OpenAiService},
};

impl OpenAiService {
    /// Runs `req` expecting a JSON object and returns the cleaned JSON text.
    ///
    /// The `json_mode` flag of `req` is ignored; it is decided from the config.
    ///
    /// # Errors
    /// - any error of [`OpenAiService::complete`] that is not a JSON-mode rejection
    /// - [`AiLlmError::InvalidJson`] when no valid JSON could be recovered
    pub async fn complete_json(&self, req: &CompletionRequest<'_>) -> Result<String, AiLlmError> {
        let use_json_mode = self.config().json_mode_supported();
        let strict = req.clone().json_mode(use_json_mode);
        let relaxed = req.clone().json_mode(false);

        let content = match self.complete(&strict).await {
            Ok(content) => content,
            Err(err) if use_json_mode && err.is_json_mode_rejection() => {
                warn!(
                    step = req.step,
                    error = %err,
                    "retrying without response_format json_object"
                );
                self.complete(&relaxed).await?
            }
            Err(err) => return Err(err),
        };

        if let Some(json) = normalize_json_content(&content) {
            return Ok(json);
        }

        warn!(
            step = req.step,
            "response was not valid JSON, retrying once without json_object mode"
        );
        let content = self.complete(&relaxed).await?;

        normalize_json_content(&content).ok_or_else(|| AiLlmError::InvalidJson {
            step: req.step.to_string(),
        })
    }
}
