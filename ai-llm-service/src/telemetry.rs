use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// Max characters of a prompt/response body written to logs.
pub const PREVIEW_MAX_CHARS: usize = 2500;

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build a **library-scoped** formatting layer that renders ONLY events emitted by this crate.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format
/// - `file:line` and target (module path)
/// - ANSI colors only when stdout is a terminal
///
/// This layer uses a per-event filter so it does **not** affect logs from other crates.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// Level directive for **this** library only, e.g. `ai_llm_service=debug`.
pub fn level_directive(level: Level) -> Option<Directive> {
    let s = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// EnvFilter from `RUST_LOG` as given; when it is unset, blank or invalid,
/// `default` plus a per-crate level for this library.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    env_filter_from(rust_log.as_deref(), default, level)
}

fn env_filter_from(rust_log: Option<&str>, default: &str, level: Level) -> EnvFilter {
    if let Some(spec) = rust_log.filter(|s| !s.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(spec) {
            return filter;
        }
    }

    let base = EnvFilter::new(default);
    match level_directive(level) {
        Some(directive) => base.add_directive(directive),
        None => base,
    }
}

/// Shortens a prompt/response body for logging.
pub fn preview_for_log(value: &str) -> String {
    preview_with_limit(value, PREVIEW_MAX_CHARS)
}

/// Keeps the first `max_chars` characters and notes the original length.
pub fn preview_with_limit(value: &str, max_chars: usize) -> String {
    let total = value.chars().count();
    if total <= max_chars {
        return value.to_string();
    }
    let head: String = value.chars().take(max_chars).collect();
    format!("{head}\n... [truncated, total_chars={total}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_pass_through() {
        assert_eq!(preview_with_limit("abc", 3), "abc");
    }

    #[test]
    fn long_values_are_cut_on_char_boundaries() {
        let out = preview_with_limit("తెలుగు text", 3);
        assert!(out.starts_with("తెల"));
        assert!(out.ends_with("[truncated, total_chars=11]"));
    }

    #[test]
    fn directive_targets_this_crate() {
        let d = level_directive(Level::DEBUG).expect("directive");
        assert_eq!(d.to_string(), "ai_llm_service=debug");
    }

    #[test]
    fn rust_log_is_not_overridden() {
        let filter = env_filter_from(Some("warn,ai_llm_service=warn"), "info", Level::DEBUG);
        let rendered = filter.to_string();
        assert!(rendered.contains("ai_llm_service=warn"), "{rendered}");
        assert!(!rendered.contains("ai_llm_service=debug"), "{rendered}");
    }

    #[test]
    fn crate_level_applies_without_rust_log() {
        for rust_log in [None, Some("  ")] {
            let rendered = env_filter_from(rust_log, "info", Level::DEBUG).to_string();
            assert!(rendered.contains("ai_llm_service=debug"), "{rendered}");
            assert!(rendered.contains("info"), "{rendered}");
        }
    }
}
