//! Salvage JSON out of noisy chat-completion output.
//!
//! Models wrap JSON in markdown fences, prepend chatter ("Sure! Here is…"),
//! or rename the key they were asked for. The helpers here recover the first
//! well-formed object and read the expected field with progressively looser
//! lookups:
//!
//! 1. exact key,
//! 2. case-insensitive key (ignoring surrounding whitespace),
//! 3. the only field, when the object has exactly one.

use serde_json::{Map, Value};

/// Removes a leading "```json" / "```" fence and a trailing "```" fence.
pub fn strip_code_fence(value: &str) -> &str {
    let trimmed = value.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Returns the first balanced `{ ... }` slice, ignoring braces inside string literals.
///
/// The scan starts at the first `{`. Backslash escapes inside strings are
/// honoured, so `"\"}"` does not close the object. Returns `None` when the
/// object never closes.
pub fn extract_first_json_object(value: &str) -> Option<&str> {
    let start = value.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (offset, ch) in value[start..].char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(value[start..end].trim());
                }
            }
            _ => {}
        }
    }

    None
}

/// Normalizes raw model output into a valid JSON document.
///
/// Tries the fence-stripped text as a whole first, then the first embedded
/// object. `None` means the caller should retry or give up.
pub fn normalize_json_content(content: &str) -> Option<String> {
    let clean = strip_code_fence(content);
    if is_valid_json(clean) {
        return Some(clean.to_string());
    }

    extract_first_json_object(clean)
        .filter(|candidate| is_valid_json(candidate))
        .map(str::to_string)
}

fn is_valid_json(s: &str) -> bool {
    !s.is_empty() && serde_json::from_str::<Value>(s).is_ok()
}

fn parse_json_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Looks up `preferred_key` with the exact → case-insensitive → single-field fallbacks.
fn lookup_field<T, F>(raw: &str, preferred_key: &str, convert: F) -> Option<T>
where
    F: Fn(&Value) -> Option<T>,
{
    let payload = parse_json_object(raw)?;

    if let Some(found) = payload.get(preferred_key).and_then(&convert) {
        return Some(found);
    }

    if let Some(found) = payload
        .iter()
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case(preferred_key))
        .find_map(|(_, value)| convert(value))
    {
        return Some(found);
    }

    if payload.len() == 1 {
        return payload.values().next().and_then(convert);
    }

    None
}

fn value_to_string(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn value_to_string_list(value: &Value) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .as_array()?
        .iter()
        .filter_map(value_to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Reads a list of strings stored under (roughly) `preferred_key`.
///
/// Non-string and blank items are skipped; an empty result means nothing usable was found.
pub fn first_string_array_field(raw: &str, preferred_key: &str) -> Vec<String> {
    lookup_field(raw, preferred_key, value_to_string_list).unwrap_or_default()
}

/// Reads a single string stored under (roughly) `preferred_key`, trimmed.
pub fn first_string_field(raw: &str, preferred_key: &str) -> String {
    lookup_field(raw, preferred_key, value_to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_and_bare_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("plain"), "plain");
    }

    #[test]
    fn extracts_object_after_chatter() {
        let raw = "Sure! Here you go: {\"facts\": [\"a\", \"b\"]} Hope that helps {x}";
        assert_eq!(
            extract_first_json_object(raw),
            Some("{\"facts\": [\"a\", \"b\"]}")
        );
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let raw = r#"note {"article": "uses } and { and \" quotes"} tail"#;
        assert_eq!(
            extract_first_json_object(raw),
            Some(r#"{"article": "uses } and { and \" quotes"}"#)
        );
    }

    #[test]
    fn unbalanced_object_yields_none() {
        assert_eq!(extract_first_json_object("{\"a\": {\"b\": 1}"), None);
        assert_eq!(extract_first_json_object("no braces at all"), None);
    }

    #[test]
    fn normalize_handles_fenced_and_noisy_content() {
        assert_eq!(
            normalize_json_content("```json\n{\"gaps\":[\"q\"]}\n```").as_deref(),
            Some("{\"gaps\":[\"q\"]}")
        );
        assert_eq!(
            normalize_json_content("Result:\n{\"article\":\"text\"}\nThanks").as_deref(),
            Some("{\"article\":\"text\"}")
        );
        assert_eq!(normalize_json_content("I cannot help with that."), None);
        assert_eq!(normalize_json_content("{\"a\": tru}"), None);
    }

    #[test]
    fn array_field_lookup_order() {
        assert_eq!(
            first_string_array_field(r#"{"facts":["a"," b ",""]}"#, "facts"),
            vec!["a", "b"]
        );
        assert_eq!(
            first_string_array_field(r#"{" Facts ":["x"], "other": 1}"#, "facts"),
            vec!["x"]
        );
        assert_eq!(
            first_string_array_field(r#"{"items":["only", 3, "field"]}"#, "facts"),
            vec!["only", "field"]
        );
        assert!(first_string_array_field(r#"{"a":["x"],"b":["y"]}"#, "facts").is_empty());
        assert!(first_string_array_field(r#"["x"]"#, "facts").is_empty());
    }

    #[test]
    fn string_field_lookup_order() {
        assert_eq!(first_string_field(r#"{"article":" body "}"#, "article"), "body");
        assert_eq!(first_string_field(r#"{"ARTICLE":"upper"}"#, "article"), "upper");
        assert_eq!(first_string_field(r#"{"paragraph":"single"}"#, "article"), "single");
        assert_eq!(first_string_field(r#"{"article": 5, "x": "y"}"#, "article"), "");
    }
}
