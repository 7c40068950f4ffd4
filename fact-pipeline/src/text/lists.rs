//! List post-processing for model output: dedupe, cap, line parsing.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use ai_llm_service::response_normalizer::strip_code_fence;

lazy_static! {
    /// `- item`, `* item`, `1. item`, `2) item`, `3] item`, `4: item`, `5- item`.
    static ref LEADING_LIST_MARKER: Regex =
        Regex::new(r"^\s*(?:[-*]+|\d+[)\].:-]?)\s*").expect("valid list marker regex");
}

/// Trims items, drops blanks and case-insensitive duplicates.
///
/// The first occurrence wins and keeps its original casing; order is preserved.
pub fn dedupe_and_trim<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    let mut out = Vec::with_capacity(values.len());

    for value in values {
        let clean = value.as_ref().trim();
        if clean.is_empty() {
            continue;
        }
        if seen.insert(clean.to_lowercase()) {
            out.push(clean.to_string());
        }
    }

    out
}

/// Caps a list at `max` items. `max == 0` means "no cap".
pub fn limit_items(mut values: Vec<String>, max: usize) -> Vec<String> {
    if max > 0 && values.len() > max {
        values.truncate(max);
    }
    values
}

/// `["a", "b"]` → `"- a\n- b"`; empty input → empty string.
pub fn bullet_block<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses a plain-text (or JSON array) list answer into clean items.
///
/// A JSON string array is taken as-is. Otherwise every non-blank line is an
/// item, with bullets/numbering stripped. The result is deduplicated.
pub fn parse_line_list(content: &str) -> Vec<String> {
    let trimmed = strip_code_fence(content);
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
        return dedupe_and_trim(&items);
    }

    let lines: Vec<String> = trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| LEADING_LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    dedupe_and_trim(&lines)
}
