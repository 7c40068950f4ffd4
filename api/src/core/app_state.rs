use std::sync::Arc;

use ai_llm_service::{LlmService, config::default_config::config_from_env};
use fact_pipeline::{AnalysisStore, ArticleGenerator, PhaseOneService, SourceResolver};

use crate::error_handler::AppResult;

/// Timeout of the `/models` request behind `GET /health/llm`.
const HEALTH_TIMEOUT_SECS: u64 = 10;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active chat-completion provider (switchable via `PUT /api/settings`).
    pub llm: Arc<LlmService>,
    /// Saved analyses, topics and runtime settings.
    pub store: Arc<AnalysisStore>,
    /// Phase-one orchestration over `llm` and `store`.
    pub phase_one: PhaseOneService,
}

impl AppState {
    pub fn new(llm: Arc<LlmService>, store: Arc<AnalysisStore>) -> AppResult<Self> {
        let source = SourceResolver::new()?;
        let generator = ArticleGenerator::new(llm.clone());
        let phase_one = PhaseOneService::new(generator, source, store.clone());
        Ok(Self {
            llm,
            store,
            phase_one,
        })
    }

    /// Builds the state from `GROQ_*` / `OPENAI_*` / `LLM_TIMEOUT_SECS`.
    pub fn from_env() -> AppResult<Self> {
        let llm = LlmService::new(config_from_env()?, Some(HEALTH_TIMEOUT_SECS))?;
        Self::new(Arc::new(llm), Arc::new(AnalysisStore::new()))
    }
}
