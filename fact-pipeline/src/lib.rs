//! Editorial fact pipeline.
//!
//! Turns submitted article text (or a fetched page) into reviewable
//! material: literal facts, open verification questions, a draft paragraph
//! and optional headline/strapline options, translated when the requested
//! output language is not the generation language.
//!
//! The pipeline is a straight sequence of chat-completion calls through the
//! shared [`ai_llm_service::LlmService`]; it uses `tracing` for step logs and
//! plain `async fn` over concrete types.

pub mod errors;
pub mod generator;
pub mod language;
pub mod phase_one;
pub mod prompts;
pub mod source;
pub mod store;
pub mod text;

pub use errors::{PipelineError, PipelineResult, SourceError, StoreError};
pub use generator::ArticleGenerator;
pub use language::OutputLanguage;
pub use phase_one::{HeadlineOptions, PhaseOneInput, PhaseOneResponse, PhaseOneService};
pub use source::{ResolvedSource, SourceResolver};
pub use store::{
    Analysis, AnalysisStore, AnalysisSummary, AnalysisUpdate, Dashboard, FactRecord, FactUpdate,
    GapRecord, GapUpdate, NewAnalysis, RuntimeSettings, Topic,
};
