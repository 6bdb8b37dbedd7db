//! Component metadata declaration parsing.
//!
//! A component file declares itself registrable with a bounded key:value
//! block inside its leading comment, marked by `@component`:
//!
//! ```text
//! /* @component
//!  * type: hero
//!  * name: Hero Banner
//!  * description: Large banner with headline and call to action
//!  * category: layout
//!  * icon: sparkles
//!  */
//! ```
//!
//! `//`-style comment runs are accepted too. Parsing is best-effort
//! pattern matching over lines, never full-language parsing: the block
//! ends at the close of the comment or at the first line that is neither
//! blank nor `key: value`.

use regex::Regex;
use std::sync::LazyLock;

/// Marker opening a metadata block.
const META_MARKER: &str = "@component";

/// Upper bound on lines scanned after the marker. Keeps the block bounded
/// even in files with no comment terminator.
const MAX_META_LINES: usize = 32;

/// Matches one `key: value` line (after comment decoration is stripped).
static KEY_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\s*:\s*(.+)$").unwrap());

/// Valid component type tags.
static TYPE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap());

/// Raw fields of a metadata declaration.
///
/// `type` and `category` are required; the rest fall back to defaults
/// derived from the type tag when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaFields {
    pub type_tag: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub icon: Option<String>,
}

/// Parse the first metadata declaration in a component source file.
///
/// Returns `Ok(None)` when the file carries no `@component` marker (the
/// file is eligible but not registrable), `Err` when a marker is present
/// but the declaration is unusable.
pub fn parse_meta(source: &str) -> Result<Option<MetaFields>, String> {
    let mut lines = source.lines();

    // Scan for the marker line; everything before it is ignored.
    let found = lines.by_ref().any(|line| line.contains(META_MARKER));
    if !found {
        return Ok(None);
    }

    let mut type_tag = None;
    let mut name = None;
    let mut description = None;
    let mut category = None;
    let mut icon = None;

    for line in lines.take(MAX_META_LINES) {
        let (stripped, terminated) = match line.find("*/") {
            Some(pos) => (&line[..pos], true),
            None => (line, false),
        };
        let stripped = strip_comment_decoration(stripped);

        if let Some(cap) = KEY_VALUE_RE.captures(stripped) {
            let value = cap[2].trim().to_owned();
            match cap[1].to_ascii_lowercase().as_str() {
                "type" => type_tag = Some(value),
                "name" => name = Some(value),
                "description" => description = Some(value),
                "category" => category = Some(value),
                "icon" => icon = Some(value),
                // Unknown keys are ignored, not errors.
                _ => {}
            }
        } else if !stripped.is_empty() {
            break;
        }

        if terminated {
            break;
        }
    }

    let type_tag = type_tag.ok_or("metadata block is missing required key `type`")?;
    let category = category.ok_or("metadata block is missing required key `category`")?;

    if !TYPE_TAG_RE.is_match(&type_tag) {
        return Err(format!("invalid component type tag `{type_tag}`"));
    }

    Ok(Some(MetaFields {
        type_tag,
        name,
        description,
        category,
        icon,
    }))
}

/// Strip leading comment decoration (`*`, `//`, `/*`) and whitespace.
fn strip_comment_decoration(line: &str) -> &str {
    let line = line.trim_start();
    let line = line
        .strip_prefix("//")
        .or_else(|| line.strip_prefix("/*"))
        .or_else(|| line.strip_prefix('*'))
        .unwrap_or(line);
    line.trim()
}

/// Turn a type tag into a display name: `hero-banner` -> `Hero Banner`.
pub fn humanize(tag: &str) -> String {
    tag.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_comment_declaration() {
        let source = r#"
/* @component
 * type: hero
 * name: Hero Banner
 * description: Large banner with headline and call to action
 * category: layout
 * icon: sparkles
 */
export default function Hero({ headline }) {}
"#;
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.type_tag, "hero");
        assert_eq!(meta.name.as_deref(), Some("Hero Banner"));
        assert_eq!(meta.category, "layout");
        assert_eq!(meta.icon.as_deref(), Some("sparkles"));
    }

    #[test]
    fn test_line_comment_declaration() {
        let source = "\
// @component
// type: footer-nav
// category: navigation
export default function FooterNav() {}
";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.type_tag, "footer-nav");
        assert_eq!(meta.category, "navigation");
        assert_eq!(meta.name, None);
    }

    #[test]
    fn test_keys_tolerate_tab_separators() {
        let source = "// @component\n// type:\thero\n// category:\tlayout\n";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.type_tag, "hero");
        assert_eq!(meta.category, "layout");
    }

    #[test]
    fn test_no_marker_is_not_registrable() {
        let source = "export default function Helper() {}";
        assert_eq!(parse_meta(source).unwrap(), None);
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let source = "// @component\n// category: layout\n";
        let err = parse_meta(source).unwrap_err();
        assert!(err.contains("`type`"));
    }

    #[test]
    fn test_missing_category_is_an_error() {
        let source = "// @component\n// type: hero\n";
        let err = parse_meta(source).unwrap_err();
        assert!(err.contains("`category`"));
    }

    #[test]
    fn test_invalid_type_tag() {
        let source = "// @component\n// type: 3 bad tags\n// category: layout\n";
        assert!(parse_meta(source).is_err());
    }

    #[test]
    fn test_block_ends_at_comment_close() {
        let source = "\
/* @component
 * type: card
 * category: content
 */
// description: this line is code territory, not metadata
";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_block_ends_at_non_metadata_line() {
        let source = "\
// @component
// type: card
// category: content
export default function Card() {}
// icon: never-reached
";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.icon, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let source = "// @component\n// type: card\n// category: content\n// weight: 10\n";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.type_tag, "card");
    }

    #[test]
    fn test_value_may_contain_colon() {
        let source =
            "// @component\n// type: card\n// category: content\n// description: usage: drop anywhere\n";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.description.as_deref(), Some("usage: drop anywhere"));
    }

    #[test]
    fn test_only_first_declaration_counts() {
        let source = "\
// @component
// type: first
// category: a

// @component
// type: second
// category: b
";
        let meta = parse_meta(source).unwrap().unwrap();
        assert_eq!(meta.type_tag, "first");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("hero"), "Hero");
        assert_eq!(humanize("hero-banner"), "Hero Banner");
        assert_eq!(humanize("footer_nav_links"), "Footer Nav Links");
    }
}
