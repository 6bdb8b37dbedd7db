//! Placeholder token extraction and merge.
//!
//! Component and theme sources carry `{{NAME}}` placeholders that the
//! generation pipeline fills with synthesized copy. Names are
//! case-sensitive, match `[A-Za-z_][A-Za-z0-9_]*`, and never nest.
//!
//! Both operations here are pure: `extract_tokens` scans, `merge`
//! substitutes. Anything that writes to disk lives in `generate`.

use crate::error::GenerateError;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// Matches a single `{{NAME}}` span.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}").unwrap());

/// Extract the token universe of a piece of source.
///
/// Returns the de-duplicated inner names in first-appearance order.
pub fn extract_tokens(source: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();

    for cap in TOKEN_RE.captures_iter(source) {
        let name = &cap[1];
        if seen.insert(name.to_owned()) {
            tokens.push(name.to_owned());
        }
    }

    tokens
}

/// Merge a content map into source text.
///
/// The map must cover the source's full token universe; any token absent
/// from it aborts the merge as a data-integrity failure, before anything
/// is substituted. Substitution is a single pass over the source, so
/// values land verbatim even when they contain `{{...}}` spans of their
/// own.
pub fn merge(source: &str, content: &BTreeMap<String, String>) -> Result<String, GenerateError> {
    let missing: Vec<String> = extract_tokens(source)
        .into_iter()
        .filter(|token| !content.contains_key(token))
        .collect();
    if !missing.is_empty() {
        return Err(GenerateError::IncompleteContent { tokens: missing });
    }

    let merged = TOKEN_RE.replace_all(source, |cap: &regex::Captures<'_>| content[&cap[1]].clone());
    Ok(merged.into_owned())
}
