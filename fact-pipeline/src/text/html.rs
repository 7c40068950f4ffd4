//! HTML → readable plain text for fetched source pages.

use html2text::render::text_renderer::TrivialDecorator;
use lazy_static::lazy_static;
use regex::Regex;

/// Render width for html2text; large enough that paragraphs are not wrapped.
const RENDER_WIDTH: usize = 10_000;

lazy_static! {
    static ref SCRIPT_STYLE_BLOCK: Regex =
        Regex::new(r"(?is)<(script|style)\b.*?>.*?</(script|style)\s*>")
            .expect("valid script/style regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// Strips scripts/styles and markup, decodes entities and collapses whitespace.
pub fn sanitize_html_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE_BLOCK.replace_all(html, " ");
    let text = html2text::from_read_with_decorator(
        without_scripts.as_bytes(),
        RENDER_WIDTH,
        TrivialDecorator::new(),
    );
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
