//! Prompt builders for every generation stage.
//!
//! JSON stages ask for a single-key object (`facts`, `gaps`, `article`,
//! `headlines`, `straplines`) and get [`language_constraint`] appended so
//! translated runs keep the English keys.

use crate::language::OutputLanguage;

/* ---------------------------- system prompts ---------------------------- */

pub fn facts_system(lang: OutputLanguage) -> String {
    format!(
        "You are a strict fact extraction engine. Return only facts explicitly present in the input. No hallucination. Output language must be {}.",
        lang.name()
    )
}

pub fn gaps_system(lang: OutputLanguage) -> String {
    format!(
        "You identify missing verification context. Return practical unanswered questions only. Output language must be {}.",
        lang.name()
    )
}

pub fn article_system(lang: OutputLanguage) -> String {
    format!(
        "You write a concise structured article paragraph using only provided facts. Keep uncertain points as open context. Output language must be {}.",
        lang.name()
    )
}

pub fn headlines_system(lang: OutputLanguage) -> String {
    format!(
        "You generate editorial headlines from verified facts only. Output language must be {}.",
        lang.name()
    )
}

pub fn straplines_system(lang: OutputLanguage) -> String {
    format!(
        "You generate concise editorial straplines from verified facts. Output language must be {}.",
        lang.name()
    )
}

pub const TRANSLATE_LIST_SYSTEM: &str =
    "You are a precise translator. Preserve factual meaning, tone, and specificity.";

pub const TRANSLATE_TEXT_SYSTEM: &str = "You are a precise translator for news writing.";

/// Appended to JSON prompts: keys stay English, only values are localized.
pub fn language_constraint(lang: OutputLanguage) -> String {
    format!(
        "\n\nImportant: Keep the JSON keys and schema exactly as requested (for example: facts, gaps, article in English). Only translate the string values into {}.",
        lang.name()
    )
}

/* ----------------------------- user prompts ----------------------------- */

pub fn facts_prompt(input: &str) -> String {
    format!(
        "Extract clean facts from the input.

Rules:
- Use only explicit statements from input.
- Keep each fact short and clear.
- Return 5 to 8 facts maximum.
- Remove duplicates.
- Do not invent facts.

Return strict JSON:
{{\"facts\":[\"fact 1\",\"fact 2\"]}}

Input:
{input}"
    )
}

/// `facts_block` is the already formatted `Facts:\n- a\n- b` section.
pub fn gaps_prompt(facts_block: &str) -> String {
    format!(
        "Generate missing-context questions from the input facts.

Rules:
- Questions must point to missing verification context.
- Keep each question practical and specific.
- Return 5 to 8 questions maximum.
- Do not answer the question.
- Remove duplicates.

Return strict JSON:
{{\"gaps\":[\"question 1\",\"question 2\"]}}

Input:
{facts_block}"
    )
}

pub fn article_prompt(facts_block: &str, gaps_block: &str) -> String {
    format!(
        "Generate one structured article paragraph.

Rules:
- Use facts as primary truth.
- Mention unresolved gaps as context.
- Keep it concise and readable.
- Keep it to one paragraph (around 80-140 words).
- Do not add unknown claims.

Return strict JSON:
{{\"article\":\"final paragraph text\"}}

Facts:
{facts_block}

Gaps:
{gaps_block}"
    )
}

pub fn headlines_prompt(facts_block: &str, article_block: &str) -> String {
    format!(
        "Generate headline options for a news analysis.

Rules:
- Return 3 to 5 distinct headlines.
- Keep each headline concise (max 12 words).
- Focus on strongest verified facts.
- Avoid clickbait and avoid questions.
- Do not invent claims.

Return strict JSON:
{{\"headlines\":[\"headline 1\",\"headline 2\"]}}

Facts:
{facts_block}

Article:
{article_block}"
    )
}

pub fn straplines_prompt(facts_block: &str, gaps_block: &str, article_block: &str) -> String {
    format!(
        "Generate strapline options for a news analysis.

Rules:
- Return 2 to 4 distinct straplines.
- Each strapline should complement a headline (max 14 words).
- Keep tone factual and editorial.
- Do not invent claims.

Return strict JSON:
{{\"straplines\":[\"strapline 1\",\"strapline 2\"]}}

Facts:
{facts_block}

Open gaps:
{gaps_block}

Article:
{article_block}"
    )
}

/// `numbered_lines` is `1. …\n2. …`.
pub fn translate_list_prompt(lang: OutputLanguage, numbered_lines: &str) -> String {
    format!(
        "Translate each line from English into {}.

Rules:
- Keep exactly the same number of lines and same order.
- Return only plain text with one translated line per output line.
- Do not return JSON.
- Do not add bullets or numbering.

Input lines:
{numbered_lines}",
        lang.name()
    )
}

pub fn translate_text_prompt(lang: OutputLanguage, text: &str) -> String {
    format!(
        "Translate the following text from English to {}.

Rules:
- Preserve all factual details.
- Keep the output as a single paragraph.
- Return only the translated text, no JSON and no explanation.

Text:
{text}",
        lang.name()
    )
}
