//! In-process analysis store.
//!
//! Holds saved analyses (article + facts + gaps + headline options), the
//! topic list used for categories and the runtime LLM settings. Everything
//! lives behind one `tokio::sync::RwLock`; ids are sequential and start at 1.
//!
//! Editors work on saved analyses through partial updates: status/category
//! of an analysis, text and flags of single facts and gaps, manual facts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use ai_llm_service::LlmProvider;

use crate::{errors::StoreError, language::OutputLanguage};

pub const STATUS_DRAFT: &str = "draft";
/// Status of a freshly generated analysis.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";

/// Origin tag of facts produced by the model.
pub const FACT_SOURCE_AI: &str = "ai";
/// Origin tag of facts added by an editor.
pub const FACT_SOURCE_MANUAL: &str = "manual";

/// Category shown for analyses without a topic.
pub const UNCATEGORIZED: &str = "Uncategorized";

const DEFAULT_LIST_LIMIT: usize = 10;
const MAX_LIST_LIMIT: usize = 200;
const TITLE_MAX_CHARS: usize = 120;

/* -------------------------------- models -------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRecord {
    pub id: i64,
    pub text: String,
    pub included: bool,
    pub confirmed: bool,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRecord {
    pub id: i64,
    pub question: String,
    pub selected: bool,
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: i64,
    pub source_url: String,
    pub raw_text: String,
    pub article: String,
    pub language: OutputLanguage,
    pub status: String,
    pub topic: Option<Topic>,
    pub facts: Vec<FactRecord>,
    pub gaps: Vec<GapRecord>,
    pub headlines: Vec<String>,
    pub straplines: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Analysis {
    /// Fact texts in stored order.
    pub fn fact_texts(&self) -> Vec<String> {
        self.facts.iter().map(|f| f.text.clone()).collect()
    }

    /// Gap questions in stored order.
    pub fn gap_questions(&self) -> Vec<String> {
        self.gaps.iter().map(|g| g.question.clone()).collect()
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            id: self.id,
            title: analysis_title(self),
            category: self
                .topic
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            status: display_status(&self.status),
            created_at: self.created_at,
        }
    }
}

/// One row of the analyses list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    /// Capitalized for display (`Pending`, `Completed`, ...).
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_analyses: usize,
    pub pending_review: usize,
    pub saved_articles: usize,
    /// Share of stored facts still marked as included, in whole percent.
    pub ai_usage_pct: usize,
    pub ai_usage_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub recent_analyses: Vec<AnalysisSummary>,
}

/// Editor patch for an analysis; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnalysisUpdate {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FactUpdate {
    pub text: Option<String>,
    pub included: Option<bool>,
    pub confirmed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct GapUpdate {
    pub text: Option<String>,
    pub selected: Option<bool>,
    pub resolved: Option<bool>,
}

/// Output of a phase-one run, ready to persist.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub source_url: String,
    pub raw_text: String,
    pub article: String,
    pub language: OutputLanguage,
    pub category: String,
    pub facts: Vec<String>,
    pub gaps: Vec<String>,
    pub headlines: Vec<String>,
    pub straplines: Vec<String>,
}

/// Provider/model pair applied before every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettings {
    pub provider: String,
    pub model: String,
    pub updated_at: DateTime<Utc>,
}

impl RuntimeSettings {
    /// Normalized pair stamped with the current time.
    ///
    /// # Errors
    /// [`StoreError::InvalidSettings`] if either field is blank or the
    /// provider is not `groq`/`openai`.
    pub fn new(provider: &str, model: &str) -> Result<Self, StoreError> {
        let provider = provider.trim().to_lowercase();
        let model = model.trim();

        if provider.is_empty() || model.is_empty() {
            return Err(StoreError::InvalidSettings("provider and model are required".into()));
        }
        if !LlmProvider::ALL.iter().any(|p| p.as_key() == provider) {
            return Err(StoreError::InvalidSettings(format!("unsupported provider: {provider}")));
        }

        Ok(Self {
            provider,
            model: model.to_string(),
            updated_at: Utc::now(),
        })
    }
}

/* -------------------------------- store --------------------------------- */

#[derive(Debug, Default)]
struct Inner {
    analyses: Vec<Analysis>,
    topics: Vec<Topic>,
    settings: Option<RuntimeSettings>,
    next_analysis_id: i64,
    next_topic_id: i64,
    next_fact_id: i64,
    next_gap_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Inner {
    fn resolve_topic(&mut self, category: &str) -> Option<Topic> {
        let name = category.trim();
        if name.is_empty() {
            return None;
        }

        let wanted = name.to_lowercase();
        if let Some(found) = self.topics.iter().find(|t| t.name.to_lowercase() == wanted) {
            return Some(found.clone());
        }

        let topic = Topic {
            id: next_id(&mut self.next_topic_id),
            name: name.to_string(),
        };
        debug!(topic_id = topic.id, name = %topic.name, "topic created");
        self.topics.push(topic.clone());
        Some(topic)
    }

    fn find_mut(&mut self, id: i64) -> Result<&mut Analysis, StoreError> {
        self.analyses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// (analysis index, fact index) of a fact id.
    fn locate_fact(&self, fact_id: i64) -> Option<(usize, usize)> {
        self.analyses.iter().enumerate().find_map(|(ai, a)| {
            a.facts.iter().position(|f| f.id == fact_id).map(|fi| (ai, fi))
        })
    }

    fn locate_gap(&self, gap_id: i64) -> Option<(usize, usize)> {
        self.analyses.iter().enumerate().find_map(|(ai, a)| {
            a.gaps.iter().position(|g| g.id == gap_id).map(|gi| (ai, gi))
        })
    }

    /// Newest first.
    fn recent(&self, limit: usize) -> Vec<AnalysisSummary> {
        self.analyses
            .iter()
            .rev()
            .take(clamp_limit(limit))
            .map(Analysis::summary)
            .collect()
    }
}

/// Shared store handle; wrap in `Arc` and clone the `Arc`.
#[derive(Debug, Default)]
pub struct AnalysisStore {
    inner: RwLock<Inner>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persists a phase-one result and returns the new analysis id.
    ///
    /// Blank facts/gaps are skipped. A non-blank category is matched to a
    /// topic case-insensitively and created when missing.
    pub async fn save_phase_one(&self, new: NewAnalysis) -> i64 {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let topic = inner.resolve_topic(&new.category);

        let mut facts = Vec::with_capacity(new.facts.len());
        for text in new.facts.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
            facts.push(FactRecord {
                id: next_id(&mut inner.next_fact_id),
                text: text.to_string(),
                included: true,
                confirmed: false,
                source: FACT_SOURCE_AI.to_string(),
            });
        }

        let mut gaps = Vec::with_capacity(new.gaps.len());
        for question in new.gaps.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
            gaps.push(GapRecord {
                id: next_id(&mut inner.next_gap_id),
                question: question.to_string(),
                selected: true,
                resolved: false,
            });
        }

        let id = next_id(&mut inner.next_analysis_id);
        info!(
            analysis_id = id,
            facts = facts.len(),
            gaps = gaps.len(),
            topic = topic.as_ref().map(|t| t.name.as_str()).unwrap_or(""),
            "analysis saved"
        );

        inner.analyses.push(Analysis {
            id,
            source_url: new.source_url,
            raw_text: new.raw_text,
            article: new.article,
            language: new.language,
            status: STATUS_PENDING.to_string(),
            topic,
            facts,
            gaps,
            headlines: new.headlines,
            straplines: new.straplines,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// # Errors
    /// [`StoreError::NotFound`] for unknown ids.
    pub async fn get(&self, id: i64) -> Result<Analysis, StoreError> {
        let inner = self.inner.read().await;
        inner
            .analyses
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replaces the headline/strapline options of an analysis.
    pub async fn set_headline_options(
        &self,
        id: i64,
        headlines: Vec<String>,
        straplines: Vec<String>,
    ) -> Result<Analysis, StoreError> {
        let mut inner = self.inner.write().await;
        let analysis = inner.find_mut(id)?;
        analysis.headlines = headlines;
        analysis.straplines = straplines;
        analysis.updated_at = Utc::now();
        Ok(analysis.clone())
    }

    /// Known topics, alphabetically.
    pub async fn categories(&self) -> Vec<Topic> {
        let mut topics = self.inner.read().await.topics.clone();
        topics.sort_by_key(|t| t.name.to_lowercase());
        topics
    }

    pub async fn settings(&self) -> Option<RuntimeSettings> {
        self.inner.read().await.settings.clone()
    }

    /// Validates and stores the provider/model pair used by subsequent runs.
    ///
    /// # Errors
    /// See [`RuntimeSettings::new`].
    pub async fn update_settings(
        &self,
        provider: &str,
        model: &str,
    ) -> Result<RuntimeSettings, StoreError> {
        let settings = RuntimeSettings::new(provider, model)?;
        Ok(self.save_settings(settings).await)
    }

    /// Stores an already validated pair.
    pub async fn save_settings(&self, settings: RuntimeSettings) -> RuntimeSettings {
        info!(provider = %settings.provider, model = %settings.model, "runtime settings updated");
        self.inner.write().await.settings = Some(settings.clone());
        settings
    }

    /* ----------------------------- editor review ----------------------------- */

    /// Saved analyses, newest first. `limit` 0 means the default of 10; at
    /// most 200 rows are returned.
    pub async fn list(&self, limit: usize) -> Vec<AnalysisSummary> {
        self.inner.read().await.recent(limit)
    }

    /// Review counters plus the most recent analyses.
    pub async fn dashboard(&self, limit: usize) -> Dashboard {
        let inner = self.inner.read().await;

        let count_status =
            |status: &str| inner.analyses.iter().filter(|a| a.status == status).count();
        let (included, total_facts) = inner
            .analyses
            .iter()
            .flat_map(|a| a.facts.iter())
            .fold((0, 0), |(inc, all), f| (inc + usize::from(f.included), all + 1));
        let ai_usage_pct = if total_facts > 0 {
            included * 100 / total_facts
        } else {
            0
        };

        Dashboard {
            summary: DashboardSummary {
                total_analyses: inner.analyses.len(),
                pending_review: count_status(STATUS_PENDING),
                saved_articles: count_status(STATUS_COMPLETED),
                ai_usage_pct,
                ai_usage_text: format!("{included} included / {total_facts} total facts"),
            },
            recent_analyses: inner.recent(limit),
        }
    }

    /// Changes status and/or category of an analysis.
    ///
    /// # Errors
    /// - [`StoreError::InvalidUpdate`] for an empty patch, an unknown status
    ///   or a blank category
    /// - [`StoreError::NotFound`] for unknown ids
    pub async fn update_analysis(
        &self,
        id: i64,
        update: AnalysisUpdate,
    ) -> Result<Analysis, StoreError> {
        if update.status.is_none() && update.category.is_none() {
            return Err(StoreError::invalid_update("no analysis fields provided"));
        }
        let status = update.status.as_deref().map(normalize_status).transpose()?;
        if update.category.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(StoreError::invalid_update("category cannot be empty"));
        }

        let mut inner = self.inner.write().await;
        inner.find_mut(id)?;
        let topic = match update.category.as_deref() {
            Some(category) => inner.resolve_topic(category),
            None => None,
        };

        let analysis = inner.find_mut(id)?;
        if let Some(status) = status {
            analysis.status = status.to_string();
        }
        if topic.is_some() {
            analysis.topic = topic;
        }
        analysis.updated_at = Utc::now();
        info!(analysis_id = id, status = %analysis.status, "analysis updated");
        Ok(analysis.clone())
    }

    /// Adds an editor-written fact (included, unconfirmed, source `manual`).
    pub async fn add_fact(&self, analysis_id: i64, text: &str) -> Result<FactRecord, StoreError> {
        let text = required_text(text, "fact text is required")?;

        let mut inner = self.inner.write().await;
        inner.find_mut(analysis_id)?;
        let fact = FactRecord {
            id: next_id(&mut inner.next_fact_id),
            text,
            included: true,
            confirmed: false,
            source: FACT_SOURCE_MANUAL.to_string(),
        };

        let analysis = inner.find_mut(analysis_id)?;
        analysis.facts.push(fact.clone());
        analysis.updated_at = Utc::now();
        debug!(analysis_id, fact_id = fact.id, "manual fact added");
        Ok(fact)
    }

    /// # Errors
    /// [`StoreError::InvalidUpdate`] for an empty patch or blank text,
    /// [`StoreError::FactNotFound`] for unknown ids.
    pub async fn update_fact(
        &self,
        fact_id: i64,
        update: FactUpdate,
    ) -> Result<FactRecord, StoreError> {
        if update.text.is_none() && update.included.is_none() && update.confirmed.is_none() {
            return Err(StoreError::invalid_update("no fact fields provided"));
        }
        let text = update
            .text
            .as_deref()
            .map(|t| required_text(t, "fact text is required"))
            .transpose()?;

        let mut inner = self.inner.write().await;
        let (ai, fi) = inner
            .locate_fact(fact_id)
            .ok_or(StoreError::FactNotFound(fact_id))?;

        let analysis = &mut inner.analyses[ai];
        let fact = &mut analysis.facts[fi];
        if let Some(text) = text {
            fact.text = text;
        }
        if let Some(included) = update.included {
            fact.included = included;
        }
        if let Some(confirmed) = update.confirmed {
            fact.confirmed = confirmed;
        }
        let updated = fact.clone();
        analysis.updated_at = Utc::now();
        Ok(updated)
    }

    pub async fn delete_fact(&self, fact_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let (ai, fi) = inner
            .locate_fact(fact_id)
            .ok_or(StoreError::FactNotFound(fact_id))?;

        let analysis = &mut inner.analyses[ai];
        analysis.facts.remove(fi);
        analysis.updated_at = Utc::now();
        debug!(analysis_id = analysis.id, fact_id, "fact deleted");
        Ok(())
    }

    /// # Errors
    /// [`StoreError::InvalidUpdate`] for an empty patch or blank text,
    /// [`StoreError::GapNotFound`] for unknown ids.
    pub async fn update_gap(
        &self,
        gap_id: i64,
        update: GapUpdate,
    ) -> Result<GapRecord, StoreError> {
        if update.text.is_none() && update.selected.is_none() && update.resolved.is_none() {
            return Err(StoreError::invalid_update("no gap fields provided"));
        }
        let question = update
            .text
            .as_deref()
            .map(|t| required_text(t, "gap text is required"))
            .transpose()?;

        let mut inner = self.inner.write().await;
        let (ai, gi) = inner
            .locate_gap(gap_id)
            .ok_or(StoreError::GapNotFound(gap_id))?;

        let analysis = &mut inner.analyses[ai];
        let gap = &mut analysis.gaps[gi];
        if let Some(question) = question {
            gap.question = question;
        }
        if let Some(selected) = update.selected {
            gap.selected = selected;
        }
        if let Some(resolved) = update.resolved {
            gap.resolved = resolved;
        }
        let updated = gap.clone();
        analysis.updated_at = Utc::now();
        Ok(updated)
    }
}

/* ------------------------------- helpers -------------------------------- */

fn normalize_status(status: &str) -> Result<&'static str, StoreError> {
    match status.trim().to_lowercase().as_str() {
        "draft" => Ok(STATUS_DRAFT),
        "pending" => Ok(STATUS_PENDING),
        "completed" => Ok(STATUS_COMPLETED),
        _ => Err(StoreError::invalid_update("status must be draft, pending, or completed")),
    }
}

/// `pending` → `Pending`; blank → `Draft`.
fn display_status(status: &str) -> String {
    let clean = status.trim().to_lowercase();
    let mut chars = clean.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Draft".to_string(),
    }
}

fn clamp_limit(limit: usize) -> usize {
    match limit {
        0 => DEFAULT_LIST_LIMIT,
        n => n.min(MAX_LIST_LIMIT),
    }
}

fn required_text(text: &str, message: &'static str) -> Result<String, StoreError> {
    let clean = text.trim();
    if clean.is_empty() {
        return Err(StoreError::invalid_update(message));
    }
    Ok(clean.to_string())
}

/// Source host+path, else the raw text folded onto one line, else `Analysis #id`.
fn analysis_title(analysis: &Analysis) -> String {
    let source = analysis.source_url.trim();
    if !source.is_empty() {
        if let Ok(url) = reqwest::Url::parse(source) {
            if let Some(host) = url.host_str() {
                let host_path = format!("{host}{}", url.path().trim_end_matches('/'));
                return clip_title(&host_path);
            }
        }
        return clip_title(source);
    }

    let raw = analysis.raw_text.split_whitespace().collect::<Vec<_>>().join(" ");
    if !raw.is_empty() {
        return clip_title(&raw);
    }
    format!("Analysis #{}", analysis.id)
}

fn clip_title(value: &str) -> String {
    if value.chars().count() <= TITLE_MAX_CHARS {
        return value.to_string();
    }
    let head: String = value.chars().take(TITLE_MAX_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_analysis(category: &str) -> NewAnalysis {
        NewAnalysis {
            source_url: String::new(),
            raw_text: "raw".into(),
            article: "body".into(),
            language: OutputLanguage::English,
            category: category.into(),
            facts: vec!["one".into(), "  ".into(), "two".into()],
            gaps: vec!["why?".into(), String::new()],
            headlines: Vec::new(),
            straplines: Vec::new(),
        }
    }

    #[tokio::test]
    async fn saves_with_review_defaults() {
        let store = AnalysisStore::new();
        let id = store.save_phase_one(new_analysis("")).await;
        assert_eq!(id, 1);

        let a = store.get(id).await.unwrap();
        assert_eq!(a.status, STATUS_PENDING);
        assert!(a.topic.is_none());
        assert_eq!(a.fact_texts(), vec!["one", "two"]);
        assert!(a.facts.iter().all(|f| f.included && !f.confirmed && f.source == "ai"));
        assert_eq!(a.gap_questions(), vec!["why?"]);
        assert!(a.gaps.iter().all(|g| g.selected && !g.resolved));
    }

    #[tokio::test]
    async fn categories_resolve_case_insensitively() {
        let store = AnalysisStore::new();
        let first = store.save_phase_one(new_analysis(" Politics ")).await;
        let second = store.save_phase_one(new_analysis("politics")).await;
        store.save_phase_one(new_analysis("Crime")).await;

        let a = store.get(first).await.unwrap().topic.unwrap();
        let b = store.get(second).await.unwrap().topic.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.name, "Politics");

        let names: Vec<String> = store.categories().await.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Crime", "Politics"]);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = AnalysisStore::new();
        assert!(matches!(store.get(7).await, Err(StoreError::NotFound(7))));
        assert!(matches!(
            store.set_headline_options(7, vec![], vec![]).await,
            Err(StoreError::NotFound(7))
        ));
    }

    #[tokio::test]
    async fn headline_options_are_replaced() {
        let store = AnalysisStore::new();
        let id = store.save_phase_one(new_analysis("")).await;
        let updated = store
            .set_headline_options(id, vec!["H".into()], vec!["S".into()])
            .await
            .unwrap();
        assert_eq!(updated.headlines, vec!["H"]);
        assert_eq!(store.get(id).await.unwrap().straplines, vec!["S"]);
    }

    #[tokio::test]
    async fn settings_validate_provider_and_model() {
        let store = AnalysisStore::new();
        assert!(store.settings().await.is_none());
        assert!(store.update_settings("anthropic", "x").await.is_err());
        assert!(store.update_settings("groq", "  ").await.is_err());

        let saved = store.update_settings(" OpenAI ", "gpt-4o-mini").await.unwrap();
        assert_eq!(saved.provider, "openai");
        assert_eq!(store.settings().await.unwrap().model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn list_is_newest_first_with_display_fields() {
        let store = AnalysisStore::new();
        let mut first = new_analysis("");
        first.source_url = "https://news.example.com/city/bridge/".into();
        store.save_phase_one(first).await;
        let mut second = new_analysis("Transport");
        second.raw_text = "  Bridge\n reopened   today ".into();
        store.save_phase_one(second).await;

        let items = store.list(0).await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].title, "Bridge reopened today");
        assert_eq!(items[0].category, "Transport");
        assert_eq!(items[0].status, "Pending");
        assert_eq!(items[1].title, "news.example.com/city/bridge");
        assert_eq!(items[1].category, UNCATEGORIZED);

        assert_eq!(store.list(1).await.len(), 1);
    }

    #[tokio::test]
    async fn long_titles_are_clipped() {
        let store = AnalysisStore::new();
        let mut new = new_analysis("");
        new.raw_text = "w".repeat(130);
        store.save_phase_one(new).await;

        let title = &store.list(10).await[0].title;
        assert_eq!(title.chars().count(), 123);
        assert!(title.ends_with("..."));
    }

    #[tokio::test]
    async fn dashboard_counts_statuses_and_included_facts() {
        let store = AnalysisStore::new();
        let a = store.save_phase_one(new_analysis("")).await;
        store.save_phase_one(new_analysis("")).await;
        store
            .update_analysis(
                a,
                AnalysisUpdate {
                    status: Some(" Completed ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let fact_id = store.get(a).await.unwrap().facts[0].id;
        store
            .update_fact(
                fact_id,
                FactUpdate {
                    included: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let dash = store.dashboard(5).await;
        assert_eq!(dash.summary.total_analyses, 2);
        assert_eq!(dash.summary.pending_review, 1);
        assert_eq!(dash.summary.saved_articles, 1);
        assert_eq!(dash.summary.ai_usage_pct, 75);
        assert_eq!(dash.summary.ai_usage_text, "3 included / 4 total facts");
        assert_eq!(dash.recent_analyses.len(), 2);
    }

    #[tokio::test]
    async fn update_analysis_validates_and_resolves_topic() {
        let store = AnalysisStore::new();
        let id = store.save_phase_one(new_analysis("Politics")).await;

        let empty = store.update_analysis(id, AnalysisUpdate::default()).await;
        assert!(matches!(empty, Err(StoreError::InvalidUpdate(_))));
        let bad_status = AnalysisUpdate {
            status: Some("published".into()),
            ..Default::default()
        };
        let err = store.update_analysis(id, bad_status).await.unwrap_err();
        assert_eq!(err.to_string(), "status must be draft, pending, or completed");
        let blank_category = AnalysisUpdate {
            category: Some("  ".into()),
            ..Default::default()
        };
        assert!(store.update_analysis(id, blank_category).await.is_err());

        let updated = store
            .update_analysis(
                id,
                AnalysisUpdate {
                    status: Some("draft".into()),
                    category: Some("politics".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, STATUS_DRAFT);
        assert_eq!(updated.topic.unwrap().name, "Politics");
        assert_eq!(store.categories().await.len(), 1);

        let missing = AnalysisUpdate {
            status: Some("draft".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_analysis(99, missing).await,
            Err(StoreError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn facts_can_be_added_edited_and_deleted() {
        let store = AnalysisStore::new();
        let id = store.save_phase_one(new_analysis("")).await;

        assert!(store.add_fact(id, "   ").await.is_err());
        assert!(matches!(
            store.add_fact(42, "x").await,
            Err(StoreError::NotFound(42))
        ));

        let added = store.add_fact(id, "  Manual fact ").await.unwrap();
        assert_eq!(added.text, "Manual fact");
        assert_eq!(added.source, FACT_SOURCE_MANUAL);
        assert!(added.included && !added.confirmed);

        let edited = store
            .update_fact(
                added.id,
                FactUpdate {
                    text: Some("Edited".into()),
                    confirmed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.text, "Edited");
        assert!(edited.confirmed && edited.included);
        assert!(matches!(
            store.update_fact(added.id, FactUpdate::default()).await,
            Err(StoreError::InvalidUpdate(_))
        ));

        store.delete_fact(added.id).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().fact_texts(), vec!["one", "two"]);
        assert!(matches!(
            store.delete_fact(added.id).await,
            Err(StoreError::FactNotFound(_))
        ));
    }

    #[tokio::test]
    async fn gaps_can_be_edited() {
        let store = AnalysisStore::new();
        let id = store.save_phase_one(new_analysis("")).await;
        let gap_id = store.get(id).await.unwrap().gaps[0].id;

        let gap = store
            .update_gap(
                gap_id,
                GapUpdate {
                    text: Some(" Who paid? ".into()),
                    selected: Some(false),
                    resolved: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(gap.question, "Who paid?");
        assert!(!gap.selected && gap.resolved);
        assert_eq!(store.get(id).await.unwrap().gap_questions(), vec!["Who paid?"]);

        assert!(matches!(
            store.update_gap(gap_id, GapUpdate::default()).await,
            Err(StoreError::InvalidUpdate(_))
        ));
        let resolve = GapUpdate {
            resolved: Some(true),
            ..Default::default()
        };
        assert!(matches!(
            store.update_gap(77, resolve).await,
            Err(StoreError::GapNotFound(77))
        ));
    }
}
