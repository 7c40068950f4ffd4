//! Text utilities shared by the stages.

mod html;
mod lists;
mod truncate;

pub use html::sanitize_html_text;
pub use lists::{bullet_block, dedupe_and_trim, limit_items, parse_line_list};
pub use truncate::{
    MAX_LLM_INPUT_CHARS, MIN_SHRINK_CHARS, compact_llm_input, shrink_prompt_input,
    truncate_for_prompt,
};
