//! Phase one: source text → facts → gaps → article (→ headline options),
//! optionally translated, then saved for editorial review.
//!
//! 1) **Settings** apply the stored provider/model pair to the LLM service
//! 2) **Input** resolve text or URL, pick output and generation language,
//!    cap the input size
//! 3) **Generation** facts, gaps from facts, article from both
//! 4) **Headline options** only when requested
//! 5) **Translation** when the output language differs from the generation
//!    language
//! 6) **Persist** and return the saved analysis id with the generated content

use std::{sync::Arc, time::Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    errors::PipelineResult,
    generator::ArticleGenerator,
    language::OutputLanguage,
    source::SourceResolver,
    store::{AnalysisStore, NewAnalysis},
    text::compact_llm_input,
};

/// One analyse request.
#[derive(Debug, Clone, Default)]
pub struct PhaseOneInput {
    pub text: String,
    pub url: String,
    /// Requested output language; blank means "detect from the input".
    pub language: String,
    pub category: String,
    pub with_headlines: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseOneResponse {
    pub article_id: i64,
    pub language: OutputLanguage,
    pub facts: Vec<String>,
    pub gaps: Vec<String>,
    pub article: String,
    pub headlines: Vec<String>,
    pub straplines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineOptions {
    pub article_id: i64,
    pub headlines: Vec<String>,
    pub straplines: Vec<String>,
}

/// Orchestrates phase one over the generator, the source resolver and the store.
#[derive(Clone)]
pub struct PhaseOneService {
    generator: ArticleGenerator,
    source: SourceResolver,
    store: Arc<AnalysisStore>,
}

impl PhaseOneService {
    pub fn new(
        generator: ArticleGenerator,
        source: SourceResolver,
        store: Arc<AnalysisStore>,
    ) -> Self {
        Self {
            generator,
            source,
            store,
        }
    }

    pub fn store(&self) -> &Arc<AnalysisStore> {
        &self.store
    }

    /// Runs the whole phase for one request.
    ///
    /// # Errors
    /// Any stage error aborts the run; nothing is saved in that case.
    pub async fn run(&self, input: PhaseOneInput) -> PipelineResult<PhaseOneResponse> {
        let t0 = Instant::now();
        self.apply_runtime_settings().await?;

        let resolved = self.source.resolve(&input.text, &input.url).await?;
        let output_lang = OutputLanguage::normalize(&input.language, &resolved.text);
        let gen_lang = output_lang.generation_language();
        let llm_input = compact_llm_input(&resolved.text);
        debug!(
            output = output_lang.code(),
            generation = gen_lang.code(),
            input_chars = llm_input.chars().count(),
            "phase1: input resolved"
        );

        let mut facts = self.generator.extract_facts(&llm_input, gen_lang).await?;
        debug!(count = facts.len(), "phase1: facts extracted");

        let mut gaps = self.generator.generate_gaps(&facts, gen_lang).await?;
        debug!(count = gaps.len(), "phase1: gaps generated");

        let mut article = self
            .generator
            .generate_article(&facts, &gaps, gen_lang)
            .await?;

        let (mut headlines, mut straplines) = if input.with_headlines {
            self.headline_options(&facts, &gaps, &article, gen_lang).await?
        } else {
            (Vec::new(), Vec::new())
        };

        if output_lang.needs_translation() {
            let t = Instant::now();
            facts = self.generator.translate_list(&facts, output_lang).await?;
            gaps = self.generator.translate_list(&gaps, output_lang).await?;
            article = self.generator.translate_text(&article, output_lang).await?;
            if !headlines.is_empty() {
                headlines = self.generator.translate_list(&headlines, output_lang).await?;
            }
            if !straplines.is_empty() {
                straplines = self.generator.translate_list(&straplines, output_lang).await?;
            }
            debug!(
                language = output_lang.code(),
                elapsed_ms = t.elapsed().as_millis() as u64,
                "phase1: output translated"
            );
        }

        let article_id = self
            .store
            .save_phase_one(NewAnalysis {
                source_url: resolved.source_url,
                raw_text: resolved.text,
                article: article.clone(),
                language: output_lang,
                category: input.category,
                facts: facts.clone(),
                gaps: gaps.clone(),
                headlines: headlines.clone(),
                straplines: straplines.clone(),
            })
            .await;

        info!(
            article_id,
            language = output_lang.code(),
            facts = facts.len(),
            gaps = gaps.len(),
            headlines = headlines.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "phase1: done"
        );

        Ok(PhaseOneResponse {
            article_id,
            language: output_lang,
            facts,
            gaps,
            article,
            headlines,
            straplines,
        })
    }

    /// Regenerates headline and strapline options for a saved analysis and
    /// stores them.
    pub async fn generate_headline_options(
        &self,
        article_id: i64,
    ) -> PipelineResult<HeadlineOptions> {
        self.apply_runtime_settings().await?;

        let analysis = self.store.get(article_id).await?;
        let gen_lang = analysis.language.generation_language();
        let facts = analysis.fact_texts();
        let gaps = analysis.gap_questions();

        let (mut headlines, mut straplines) = self
            .headline_options(&facts, &gaps, &analysis.article, gen_lang)
            .await?;
        if analysis.language.needs_translation() {
            headlines = self.generator.translate_list(&headlines, analysis.language).await?;
            straplines = self.generator.translate_list(&straplines, analysis.language).await?;
        }

        self.store
            .set_headline_options(article_id, headlines.clone(), straplines.clone())
            .await?;
        info!(article_id, headlines = headlines.len(), "headline options regenerated");

        Ok(HeadlineOptions {
            article_id,
            headlines,
            straplines,
        })
    }

    async fn headline_options(
        &self,
        facts: &[String],
        gaps: &[String],
        article: &str,
        lang: OutputLanguage,
    ) -> PipelineResult<(Vec<String>, Vec<String>)> {
        let headlines = self.generator.generate_headlines(facts, article, lang).await?;
        let straplines = self
            .generator
            .generate_straplines(facts, gaps, article, lang)
            .await?;
        Ok((headlines, straplines))
    }

    async fn apply_runtime_settings(&self) -> PipelineResult<()> {
        if let Some(settings) = self.store.settings().await {
            self.generator
                .llm()
                .apply_settings(&settings.provider, &settings.model)
                .await?;
        }
        Ok(())
    }
}
