//! Stage operations on top of the shared chat-completion service.
//!
//! Every stage is a single prompt → answer call with its own sampling knobs:
//!
//! | stage        | temperature | max_tokens | answer                  |
//! |--------------|-------------|------------|-------------------------|
//! | facts        | 0.1         | 700        | `{"facts":[..]}`        |
//! | gaps         | 0.2         | 700        | `{"gaps":[..]}`         |
//! | article      | 0.3         | 1200       | `{"article":".."}`      |
//! | headlines    | 0.35        | 700        | `{"headlines":[..]}`    |
//! | straplines   | 0.35        | 700        | `{"straplines":[..]}`   |
//! | list i18n    | 0.1         | 1400       | plain lines             |
//! | text i18n    | 0.1         | 1200       | plain paragraph         |
//!
//! JSON answers are decoded by their expected key first; if that yields
//! nothing the normalizer's lenient lookup is tried before giving up.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use ai_llm_service::{
    CompletionRequest, LlmService,
    response_normalizer::{first_string_array_field, first_string_field, strip_code_fence},
};

use crate::{
    errors::{PipelineError, PipelineResult},
    language::OutputLanguage,
    prompts,
    text::{
        bullet_block, dedupe_and_trim, limit_items, parse_line_list, shrink_prompt_input,
        truncate_for_prompt,
    },
};

/// Fact extraction is attempted at most this many times (shrinking in between).
const MAX_FACT_ATTEMPTS: usize = 4;
/// Article text handed to the headline/strapline prompts.
const ARTICLE_PROMPT_CHARS: usize = 900;
const MAX_HEADLINES: usize = 5;
const MAX_STRAPLINES: usize = 4;

/* ------------------------------- stages -------------------------------- */

struct Stage {
    step: &'static str,
    temperature: f64,
    max_tokens: u32,
}

impl Stage {
    const fn new(step: &'static str, temperature: f64, max_tokens: u32) -> Self {
        Self {
            step,
            temperature,
            max_tokens,
        }
    }

    fn request<'a>(&self, system: &'a str, user: &'a str) -> CompletionRequest<'a> {
        CompletionRequest::new(self.step, system, user)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }
}

const FACTS: Stage = Stage::new("extract-facts", 0.1, 700);
const GAPS: Stage = Stage::new("generate-gaps", 0.2, 700);
const ARTICLE: Stage = Stage::new("generate-article", 0.3, 1200);
const HEADLINES: Stage = Stage::new("generate-headlines", 0.35, 700);
const STRAPLINES: Stage = Stage::new("generate-straplines", 0.35, 700);
const TRANSLATE_LIST: Stage = Stage::new("translate-list", 0.1, 1400);
const TRANSLATE_TEXT: Stage = Stage::new("translate-text", 0.1, 1200);

/// Shape of every JSON stage answer; each stage reads its own key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StageOutput {
    facts: Vec<String>,
    gaps: Vec<String>,
    article: String,
    headlines: Vec<String>,
    straplines: Vec<String>,
}

fn decode_output(raw: &str) -> StageOutput {
    serde_json::from_str(raw).unwrap_or_default()
}

/* ------------------------------ generator ------------------------------ */

/// Runs the individual generation stages against the active LLM provider.
#[derive(Clone)]
pub struct ArticleGenerator {
    llm: Arc<LlmService>,
}

impl ArticleGenerator {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &Arc<LlmService> {
        &self.llm
    }

    /// Extracts literal facts from `text`.
    ///
    /// When the provider reports the request as too large, the input is
    /// shrunk and the call repeated, up to [`MAX_FACT_ATTEMPTS`] calls in
    /// total. Once the input cannot shrink any further the provider error is
    /// returned.
    ///
    /// # Errors
    /// - [`PipelineError::Validation`] for blank input
    /// - [`PipelineError::Llm`] for provider failures
    /// - [`PipelineError::EmptyOutput`] when no fact survives deduplication
    pub async fn extract_facts(
        &self,
        text: &str,
        lang: OutputLanguage,
    ) -> PipelineResult<Vec<String>> {
        let clean = text.trim();
        if clean.is_empty() {
            return Err(PipelineError::validation("input text is empty"));
        }

        let system = prompts::facts_system(lang);
        let constraint = prompts::language_constraint(lang);
        let mut input = clean.to_string();
        let mut attempt = 1;

        loop {
            let user = prompts::facts_prompt(&input) + &constraint;
            let err = match self.llm.complete_json(&FACTS.request(&system, &user)).await {
                Ok(raw) => {
                    let mut facts = decode_output(&raw).facts;
                    if facts.is_empty() {
                        facts = first_string_array_field(&raw, "facts");
                    }
                    return non_empty_list(FACTS.step, dedupe_and_trim(&facts));
                }
                Err(err) => err,
            };

            if !err.is_request_too_large() || attempt >= MAX_FACT_ATTEMPTS {
                return Err(err.into());
            }

            let shorter = shrink_prompt_input(&input);
            if shorter == input {
                return Err(err.into());
            }

            warn!(
                step = FACTS.step,
                attempt,
                chars_before = input.chars().count(),
                chars_after = shorter.chars().count(),
                "request too large, retrying with shorter input"
            );
            input = shorter;
            attempt += 1;
        }
    }

    /// Open verification questions derived from `facts`.
    pub async fn generate_gaps(
        &self,
        facts: &[String],
        lang: OutputLanguage,
    ) -> PipelineResult<Vec<String>> {
        let facts = require_facts(facts, "gaps")?;

        let system = prompts::gaps_system(lang);
        let user = prompts::gaps_prompt(&format!("Facts:\n{}", bullet_block(&facts)))
            + &prompts::language_constraint(lang);

        let raw = self.llm.complete_json(&GAPS.request(&system, &user)).await?;
        let mut gaps = decode_output(&raw).gaps;
        if gaps.is_empty() {
            gaps = first_string_array_field(&raw, "gaps");
        }
        non_empty_list(GAPS.step, dedupe_and_trim(&gaps))
    }

    /// One article paragraph grounded on `facts`, with `gaps` as open context.
    pub async fn generate_article(
        &self,
        facts: &[String],
        gaps: &[String],
        lang: OutputLanguage,
    ) -> PipelineResult<String> {
        let facts = require_facts(facts, "article")?;
        let gaps = dedupe_and_trim(gaps);

        let system = prompts::article_system(lang);
        let user = prompts::article_prompt(&bullet_block(&facts), &bullet_block(&gaps))
            + &prompts::language_constraint(lang);

        let raw = self.llm.complete_json(&ARTICLE.request(&system, &user)).await?;
        let mut article = decode_output(&raw).article.trim().to_string();
        if article.is_empty() {
            article = first_string_field(&raw, "article").trim().to_string();
        }
        if article.is_empty() {
            return Err(PipelineError::EmptyOutput { stage: ARTICLE.step });
        }

        debug!(step = ARTICLE.step, chars = article.chars().count(), "article generated");
        Ok(article)
    }

    /// Up to five headline options.
    pub async fn generate_headlines(
        &self,
        facts: &[String],
        article: &str,
        lang: OutputLanguage,
    ) -> PipelineResult<Vec<String>> {
        let facts = require_facts(facts, "headlines")?;

        let system = prompts::headlines_system(lang);
        let user = prompts::headlines_prompt(
            &bullet_block(&facts),
            &truncate_for_prompt(article, ARTICLE_PROMPT_CHARS),
        ) + &prompts::language_constraint(lang);

        let raw = self.llm.complete_json(&HEADLINES.request(&system, &user)).await?;
        let mut headlines = decode_output(&raw).headlines;
        if headlines.is_empty() {
            headlines = first_string_array_field(&raw, "headlines");
        }
        let headlines = non_empty_list(HEADLINES.step, dedupe_and_trim(&headlines))?;
        Ok(limit_items(headlines, MAX_HEADLINES))
    }

    /// Up to four straplines; an empty gap list is sent as `- None`.
    pub async fn generate_straplines(
        &self,
        facts: &[String],
        gaps: &[String],
        article: &str,
        lang: OutputLanguage,
    ) -> PipelineResult<Vec<String>> {
        let facts = require_facts(facts, "straplines")?;
        let gaps = dedupe_and_trim(gaps);
        let gaps_block = if gaps.is_empty() {
            "- None".to_string()
        } else {
            bullet_block(&gaps)
        };

        let system = prompts::straplines_system(lang);
        let user = prompts::straplines_prompt(
            &bullet_block(&facts),
            &gaps_block,
            &truncate_for_prompt(article, ARTICLE_PROMPT_CHARS),
        ) + &prompts::language_constraint(lang);

        let raw = self.llm.complete_json(&STRAPLINES.request(&system, &user)).await?;
        let mut straplines = decode_output(&raw).straplines;
        if straplines.is_empty() {
            straplines = first_string_array_field(&raw, "straplines");
        }
        let straplines = non_empty_list(STRAPLINES.step, dedupe_and_trim(&straplines))?;
        Ok(limit_items(straplines, MAX_STRAPLINES))
    }

    /// Translates English `items` into `lang`, one line per item.
    ///
    /// English targets (and empty lists) come back cleaned without a call.
    /// If the model returns a different number of lines, every item is
    /// translated on its own with [`ArticleGenerator::translate_text`].
    pub async fn translate_list(
        &self,
        items: &[String],
        lang: OutputLanguage,
    ) -> PipelineResult<Vec<String>> {
        if lang == OutputLanguage::English || items.is_empty() {
            return Ok(dedupe_and_trim(items));
        }

        let clean: Vec<&str> = items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .collect();
        if clean.is_empty() {
            return Err(PipelineError::validation("no items to translate"));
        }

        let numbered = clean
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("{}. {item}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n");
        let user = prompts::translate_list_prompt(lang, &numbered);

        let content = self
            .llm
            .complete(&TRANSLATE_LIST.request(prompts::TRANSLATE_LIST_SYSTEM, &user))
            .await?;

        let translated = parse_line_list(&content);
        if translated.is_empty() {
            return Err(PipelineError::EmptyOutput { stage: TRANSLATE_LIST.step });
        }
        if translated.len() == clean.len() {
            return Ok(translated);
        }

        warn!(
            step = TRANSLATE_LIST.step,
            expected = clean.len(),
            got = translated.len(),
            "line count mismatch, translating items one by one"
        );
        let mut out = Vec::with_capacity(clean.len());
        for item in clean {
            out.push(self.translate_text(item, lang).await?);
        }
        Ok(out)
    }

    /// Translates an English paragraph into `lang`.
    pub async fn translate_text(&self, text: &str, lang: OutputLanguage) -> PipelineResult<String> {
        let clean = text.trim();
        if clean.is_empty() {
            return Err(PipelineError::validation("text is empty"));
        }
        if lang == OutputLanguage::English {
            return Ok(clean.to_string());
        }

        let user = prompts::translate_text_prompt(lang, clean);
        let content = self
            .llm
            .complete(&TRANSLATE_TEXT.request(prompts::TRANSLATE_TEXT_SYSTEM, &user))
            .await?;

        let translated = strip_code_fence(&content).trim();
        if translated.is_empty() {
            return Err(PipelineError::EmptyOutput { stage: TRANSLATE_TEXT.step });
        }
        Ok(translated.to_string())
    }
}

fn require_facts(facts: &[String], target: &str) -> PipelineResult<Vec<String>> {
    let facts = dedupe_and_trim(facts);
    if facts.is_empty() {
        return Err(PipelineError::validation(format!(
            "facts are required to generate {target}"
        )));
    }
    Ok(facts)
}

fn non_empty_list(stage: &'static str, items: Vec<String>) -> PipelineResult<Vec<String>> {
    if items.is_empty() {
        return Err(PipelineError::EmptyOutput { stage });
    }
    debug!(step = stage, count = items.len(), "stage produced items");
    Ok(items)
}
