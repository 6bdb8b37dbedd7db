//! Structured-data recovery from loosely-structured backend responses.
//!
//! Models rarely return bare JSON: the payload tends to arrive wrapped in
//! prose, a fenced code block, or both. Recovery runs a fixed chain of
//! pure extraction attempts and parses the first candidate that succeeds:
//!
//! 1. a fenced block tagged with the expected format (```json ... ```),
//! 2. any generic fenced block,
//! 3. the largest bracket-delimited span in the raw text,
//! 4. the raw trimmed text itself.
//!
//! When nothing parses, the caller gets `None` and surfaces a typed parse
//! failure; partial structure is never guessed at.

use serde::de::DeserializeOwned;

/// One extraction attempt: raw response + expected format tag.
type Extract = fn(&str, &str) -> Option<String>;

/// The ordered chain. Extraction only; parsing happens in [`recover`].
const CHAIN: &[Extract] = &[tagged_fence, any_fence, bracket_span, raw_trimmed];

/// Recover a deserializable value from a raw response.
///
/// `format_tag` names the fence language expected from the backend
/// (`"json"` throughout this crate).
pub fn recover<T: DeserializeOwned>(raw: &str, format_tag: &str) -> Option<T> {
    for extract in CHAIN {
        if let Some(candidate) = extract(raw, format_tag)
            && let Ok(value) = serde_json::from_str(&candidate)
        {
            return Some(value);
        }
    }
    None
}

/// Body of the first fenced block tagged with the expected format.
fn tagged_fence(raw: &str, format_tag: &str) -> Option<String> {
    let open = format!("```{format_tag}");
    let start = raw.find(&open)? + open.len();
    let rest = raw.get(start..)?;

    // The remainder of the fence line must be blank: ```jsonc is not ```json.
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        return None;
    }

    let body = &rest[newline + 1..];
    let end = body.find("```")?;
    Some(body[..end].to_owned())
}

/// Body of the first fenced block of any language.
fn any_fence(raw: &str, _format_tag: &str) -> Option<String> {
    let start = raw.find("```")? + 3;
    let rest = raw.get(start..)?;
    let newline = rest.find('\n')?;
    let body = &rest[newline + 1..];
    let end = body.find("```")?;
    Some(body[..end].to_owned())
}

/// Largest `{...}` or `[...]` span found by scanning the raw text.
fn bracket_span(raw: &str, _format_tag: &str) -> Option<String> {
    let braces = delimited(raw, '{', '}');
    let brackets = delimited(raw, '[', ']');

    match (braces, brackets) {
        (Some(a), Some(b)) => Some(if a.len() >= b.len() { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn delimited(raw: &str, open: char, close: char) -> Option<String> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    if end < start {
        return None;
    }
    Some(raw[start..=end].to_owned())
}

/// The raw text itself, trimmed.
fn raw_trimmed(raw: &str, _format_tag: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    #[test]
    fn test_tagged_fence_wins() {
        let raw = "Here you go:\n```json\n{\"a\": 1}\n```\nthanks";
        let value: Value = recover(raw, "json").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_tagged_fence_requires_exact_tag() {
        // ```jsonc is not a ```json fence; the generic fence attempt
        // still recovers the body.
        let raw = "```jsonc\n{\"a\": 2}\n```";
        assert_eq!(tagged_fence(raw, "json"), None);
        let value: Value = recover(raw, "json").unwrap();
        assert_eq!(value, json!({"a": 2}));
    }

    #[test]
    fn test_generic_fence_fallback() {
        let raw = "```\n[1, 2, 3]\n```";
        let value: Value = recover(raw, "json").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_bracket_span_from_prose() {
        let raw = "Sure! The map you wanted is {\"NAME\": \"Ann\", \"SITE\": \"Acme\"} - enjoy.";
        let map: BTreeMap<String, String> = recover(raw, "json").unwrap();
        assert_eq!(map["NAME"], "Ann");
        assert_eq!(map["SITE"], "Acme");
    }

    #[test]
    fn test_bracket_span_prefers_larger_span() {
        let raw = "take {\"a\": [1, 2, 3], \"b\": 4} please";
        // The brace span contains the bracket span and wins by length.
        let value: Value = recover(raw, "json").unwrap();
        assert_eq!(value["b"], json!(4));
    }

    #[test]
    fn test_raw_text_last_resort() {
        let value: Value = recover("  42  ", "json").unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_broken_tagged_fence_falls_through() {
        // The tagged fence holds invalid JSON; the bracket span inside
        // the prose tail parses instead.
        let raw = "```json\n[oops\n```\nactual: {\"ok\": true}";
        let value: Value = recover(raw, "json").unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_nothing_parses() {
        assert_eq!(recover::<Value>("complete gibberish", "json"), None);
        assert_eq!(recover::<Value>("", "json"), None);
    }

    #[test]
    fn test_typed_recovery() {
        let raw = "```json\n{\"HEADLINE\": \"Hi\"}\n```";
        let map: BTreeMap<String, String> = recover(raw, "json").unwrap();
        assert_eq!(map["HEADLINE"], "Hi");
    }
}
