//! Character-based (not byte-based) truncation helpers for prompt inputs.

/// Upper bound of source text sent to the model.
pub const MAX_LLM_INPUT_CHARS: usize = 12_000;

/// Floor below which an oversized prompt input is not shrunk any further.
pub const MIN_SHRINK_CHARS: usize = 900;

/// Each shrink step keeps this share of the input.
const SHRINK_RATIO: f64 = 0.72;

fn take_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Trims `value` and cuts it to `max_chars` characters. `max_chars == 0` → empty.
pub fn truncate_for_prompt(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    take_chars(value.trim(), max_chars).trim().to_string()
}

/// Trimmed source text capped at [`MAX_LLM_INPUT_CHARS`].
pub fn compact_llm_input(raw: &str) -> String {
    take_chars(raw.trim(), MAX_LLM_INPUT_CHARS).to_string()
}

/// One shrink step after a request-too-large rejection.
///
/// Inputs at or under [`MIN_SHRINK_CHARS`] come back trimmed and otherwise
/// unchanged, which tells the caller to stop retrying. Longer inputs are cut
/// to 72% (never below the floor, always strictly shorter).
pub fn shrink_prompt_input(text: &str) -> String {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len <= MIN_SHRINK_CHARS {
        return trimmed.to_string();
    }

    let next_len = ((len as f64) * SHRINK_RATIO) as usize;
    let next_len = next_len.max(MIN_SHRINK_CHARS).min(len - 1);

    take_chars(trimmed, next_len).trim().to_string()
}
