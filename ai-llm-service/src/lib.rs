//! Shared LLM service: an OpenAI-compatible chat-completion client with
//! JSON salvage, JSON-mode degradation, runtime provider switching and
//! health checks.

pub mod active_provider;
pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod response_normalizer;
pub mod services;
pub mod telemetry;

pub use active_provider::LlmService;
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, Result};
pub use services::open_ai_service::{CompletionRequest, OpenAiService};
