//! Content synthesis prompts and the deterministic fallback.
//!
//! Synthesis asks the backend for a token -> short-copy map scoped by
//! site context and a creativity directive. The fallback derives filler
//! for any token the backend missed, so the map handed to merge always
//! covers the full token universe.

use super::SiteContext;
use super::backend::Creativity;
use super::parse;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Filler phrases for common UI copy tokens.
const FALLBACK_PHRASES: &[(&str, &str)] = &[
    ("HEADLINE", "Build something great"),
    ("SUBHEADLINE", "Everything you need to get started"),
    ("TAGLINE", "Made for you"),
    ("TITLE", "Welcome"),
    ("SUBTITLE", "Discover what we do"),
    ("DESCRIPTION", "We help you reach your goals"),
    ("INTRO_TEXT", "We help you reach your goals"),
    ("CTA_TEXT", "Get started"),
    ("BUTTON_TEXT", "Learn more"),
    ("LINK_TEXT", "Read more"),
    ("FOOTER_TEXT", "All rights reserved"),
    ("COPYRIGHT", "All rights reserved"),
    ("NAV_HOME", "Home"),
    ("NAV_ABOUT", "About"),
    ("NAV_CONTACT", "Contact"),
];

/// Build the content-synthesis prompt for one token set.
pub fn content_prompt(tokens: &[String], site: &SiteContext, creativity: Creativity) -> String {
    let mut prompt = String::new();

    writeln!(
        prompt,
        "Write short website copy for the site \"{}\".",
        site.name
    )
    .ok();
    if !site.industry.is_empty() {
        writeln!(prompt, "Industry: {}.", site.industry).ok();
    }
    if let Some(personality) = &site.brand_personality {
        writeln!(prompt, "Brand personality: {personality}.").ok();
    }
    writeln!(prompt, "{}", creativity.directive()).ok();
    writeln!(prompt).ok();
    writeln!(
        prompt,
        "Respond with a JSON object containing exactly these keys, each \
         mapped to a short text of roughly 1 to 8 words:"
    )
    .ok();
    for token in tokens {
        writeln!(prompt, "- {token}").ok();
    }

    prompt
}

/// Parse a synthesis response into a token -> text map.
///
/// Non-object responses yield `None`; non-string values are stringified
/// rather than dropped, so a numeric year in a COPYRIGHT value survives.
pub fn parse_content_map(raw: &str) -> Option<BTreeMap<String, String>> {
    let value: Value = parse::recover(raw, "json")?;
    let object = value.as_object()?;

    Some(
        object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
    )
}

/// Deterministic filler for one token.
///
/// Lookup order: phrase table, site-name tokens, the token name
/// humanized, the site name.
pub fn fallback_value(token: &str, site: &SiteContext) -> String {
    if let Some((_, phrase)) = FALLBACK_PHRASES.iter().find(|(name, _)| *name == token) {
        return (*phrase).to_owned();
    }

    let upper = token.to_ascii_uppercase();
    if upper.contains("SITE") || upper.contains("BRAND") || upper.contains("COMPANY") {
        return site.name.clone();
    }

    let humanized = humanize_token(token);
    if humanized.is_empty() {
        site.name.clone()
    } else {
        humanized
    }
}

/// Complete a (possibly partial) synthesis result over a token set.
///
/// Every token ends up with a non-empty value; synthesized values win,
/// blank or missing ones fall back. Extraneous keys the backend invented
/// are dropped.
pub fn complete_content(
    tokens: &[String],
    partial: BTreeMap<String, String>,
    site: &SiteContext,
) -> BTreeMap<String, String> {
    tokens
        .iter()
        .map(|token| {
            let value = partial
                .get(token)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .unwrap_or_else(|| fallback_value(token, site));
            (token.clone(), value)
        })
        .collect()
}

/// `FEATURE_LIST_TITLE` -> `Feature list title`.
fn humanize_token(token: &str) -> String {
    let words: Vec<String> = token
        .split('_')
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();

    let mut text = words.join(" ");
    if let Some(first) = text.get(..1).map(str::to_ascii_uppercase) {
        text.replace_range(..1, &first);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteContext {
        SiteContext {
            name: "Acme".into(),
            industry: "hardware".into(),
            style_preference: None,
            brand_personality: Some("down to earth".into()),
        }
    }

    #[test]
    fn test_prompt_lists_every_token() {
        let tokens = vec!["HEADLINE".to_string(), "CTA_TEXT".to_string()];
        let prompt = content_prompt(&tokens, &site(), Creativity::Balanced);

        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("hardware"));
        assert!(prompt.contains("down to earth"));
        assert!(prompt.contains("- HEADLINE"));
        assert!(prompt.contains("- CTA_TEXT"));
    }

    #[test]
    fn test_parse_content_map_from_fenced_response() {
        let raw = "```json\n{\"HEADLINE\": \"Hi\", \"YEAR\": 2026}\n```";
        let map = parse_content_map(raw).unwrap();
        assert_eq!(map["HEADLINE"], "Hi");
        assert_eq!(map["YEAR"], "2026");
    }

    #[test]
    fn test_parse_content_map_rejects_non_object() {
        assert!(parse_content_map("[1, 2]").is_none());
        assert!(parse_content_map("not even json").is_none());
    }

    #[test]
    fn test_fallback_table_hit() {
        assert_eq!(fallback_value("CTA_TEXT", &site()), "Get started");
    }

    #[test]
    fn test_fallback_site_name_tokens() {
        assert_eq!(fallback_value("SITE_NAME", &site()), "Acme");
        assert_eq!(fallback_value("BRAND", &site()), "Acme");
        assert_eq!(fallback_value("COMPANY_NAME", &site()), "Acme");
    }

    #[test]
    fn test_fallback_humanizes_unknown_tokens() {
        assert_eq!(fallback_value("FEATURE_LIST_TITLE", &site()), "Feature list title");
    }

    #[test]
    fn test_complete_content_fills_missing_tokens() {
        let tokens = vec!["NAME".to_string(), "SITE".to_string()];
        let partial: BTreeMap<_, _> = [("NAME".to_string(), "Ann".to_string())].into();

        let complete = complete_content(&tokens, partial, &site());

        assert_eq!(complete["NAME"], "Ann");
        assert_eq!(complete["SITE"], "Acme");
        assert_eq!(complete.len(), 2);
    }

    #[test]
    fn test_complete_content_replaces_blank_values() {
        let tokens = vec!["HEADLINE".to_string()];
        let partial: BTreeMap<_, _> = [("HEADLINE".to_string(), "   ".to_string())].into();

        let complete = complete_content(&tokens, partial, &site());
        assert_eq!(complete["HEADLINE"], "Build something great");
    }

    #[test]
    fn test_complete_content_drops_invented_keys() {
        let tokens = vec!["HEADLINE".to_string()];
        let partial: BTreeMap<_, _> =
            [("INVENTED".to_string(), "x".to_string())].into();

        let complete = complete_content(&tokens, partial, &site());
        assert_eq!(complete.len(), 1);
        assert!(complete.contains_key("HEADLINE"));
    }
}
