//! Crate-wide error hierarchy for fact-pipeline.
//!
//! - Single root `PipelineError` for all public functions.
//! - LLM failures pass through untouched so callers can still classify them
//!   (request too large, JSON-mode rejection, API status).
//! - Ergonomic `?` via `From` impls.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Root error type for the fact-pipeline crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Chat-completion failure (transport, API status, invalid JSON).
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    /// Source text could not be resolved from text/url input.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Analysis store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bad caller input (blank text, missing facts, etc.).
    #[error("validation error: {0}")]
    Validation(String),

    /// The model answered, but nothing usable survived post-processing.
    #[error("{stage}: model returned no usable output")]
    EmptyOutput { stage: &'static str },
}

impl PipelineError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        PipelineError::Validation(msg.into())
    }
}

/// Input resolution errors (text vs. url, fetching, extraction).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("provide either text or url")]
    MissingInput,

    #[error("url is invalid")]
    InvalidUrl,

    #[error("failed to fetch url: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to fetch url: status {0}")]
    HttpStatus(u16),

    #[error("could not extract readable text from url")]
    NoReadableText,
}

impl SourceError {
    /// Caller mistakes as opposed to upstream failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SourceError::MissingInput | SourceError::InvalidUrl)
    }
}

/// Analysis store errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("analysis {0} not found")]
    NotFound(i64),

    #[error("fact {0} not found")]
    FactNotFound(i64),

    #[error("gap {0} not found")]
    GapNotFound(i64),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Rejected editor change (blank text, unknown status, empty patch).
    #[error("{0}")]
    InvalidUpdate(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::FactNotFound(_) | StoreError::GapNotFound(_)
        )
    }

    pub(crate) fn invalid_update(msg: impl Into<String>) -> Self {
        StoreError::InvalidUpdate(msg.into())
    }
}
