//! Generated registration manifest artifact.
//!
//! Discovery can emit a "manifest source" module next to the components:
//! an import list, a registry object, and lookup/render/filter helpers.
//! The artifact is derived purely from the in-memory manifest and is
//! regenerable at will; it is never an input to discovery.

use super::RegistrySnapshot;
use crate::config::ThemeConfig;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Render the manifest module source for a snapshot.
///
/// Import paths are emitted relative to the component directory, where
/// the manifest conventionally lives.
pub fn manifest_module_source(snapshot: &RegistrySnapshot) -> String {
    let mut imports = String::new();
    let mut entries = String::new();
    let mut used_idents = HashSet::new();

    for entry in snapshot.iter() {
        let meta = &entry.meta;
        let ident = import_ident(&meta.source, &mut used_idents);
        let path = meta.source.to_string_lossy().replace('\\', "/");

        writeln!(imports, "import {ident} from './{path}';").ok();

        writeln!(entries, "  '{}': {{", js_escape(&meta.type_tag)).ok();
        writeln!(entries, "    component: {ident},").ok();
        writeln!(entries, "    name: '{}',", js_escape(&meta.name)).ok();
        writeln!(entries, "    description: '{}',", js_escape(&meta.description)).ok();
        writeln!(entries, "    category: '{}',", js_escape(&meta.category)).ok();
        writeln!(entries, "    icon: '{}',", js_escape(&meta.icon)).ok();
        writeln!(entries, "  }},").ok();
    }

    format!(
        "\
// Generated by sitewright. Derived from the component manifest;
// regenerated on every discovery run. Do not edit.

{imports}
export const registry = {{
{entries}}};

export function getComponent(type) {{
  return registry[type] ? registry[type].component : null;
}}

export function renderComponent(type, props) {{
  const Component = getComponent(type);
  return Component ? <Component {{...props}} /> : null;
}}

export function getComponentsByCategory(category) {{
  return Object.entries(registry)
    .filter(([, entry]) => entry.category === category)
    .map(([type, entry]) => ({{ type, ...entry }}));
}}
"
    )
}

/// Write the manifest module into a theme directory.
///
/// Returns the path written. Overwrites any previous artifact.
pub fn write_manifest_module(
    snapshot: &RegistrySnapshot,
    theme_dir: &Path,
    config: &ThemeConfig,
) -> Result<PathBuf> {
    let path = theme_dir.join(&config.manifest);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }

    let source = manifest_module_source(snapshot);
    fs::write(&path, source)
        .with_context(|| format!("failed to write manifest `{}`", path.display()))?;

    Ok(path)
}

/// Derive a unique JS import identifier from a source path.
fn import_ident(source: &Path, used: &mut HashSet<String>) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Component".to_owned());

    let mut ident: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, 'C');
    }

    // Same file stem in different subdirectories: suffix a counter.
    let base = ident.clone();
    let mut n = 1;
    while !used.insert(ident.clone()) {
        n += 1;
        ident = format!("{base}{n}");
    }

    ident
}

/// Escape a string for a single-quoted JS literal.
fn js_escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::discover;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ThemeConfig) {
        let dir = TempDir::new().unwrap();
        let components = dir.path().join("components");
        fs::create_dir_all(components.join("cards")).unwrap();
        fs::write(
            components.join("Hero.jsx"),
            "// @component\n// type: hero\n// name: Hero Banner\n// category: layout\n",
        )
        .unwrap();
        fs::write(
            components.join("cards/Hero.jsx"),
            "// @component\n// type: card-hero\n// category: content\n",
        )
        .unwrap();
        (dir, ThemeConfig::default())
    }

    #[test]
    fn test_module_source_shape() {
        let (dir, config) = fixture();
        let report = discover(dir.path(), &config);

        let source = manifest_module_source(&report.manifest);

        // Entries are emitted in type-tag order: card-hero before hero.
        assert!(source.contains("import Hero from './cards/Hero.jsx';"));
        // Duplicate file stem gets a suffixed identifier.
        assert!(source.contains("import Hero2 from './Hero.jsx';"));
        assert!(source.contains("'hero': {"));
        assert!(source.contains("name: 'Hero Banner',"));
        assert!(source.contains("export function getComponent(type)"));
        assert!(source.contains("export function renderComponent(type, props)"));
        assert!(source.contains("export function getComponentsByCategory(category)"));
    }

    #[test]
    fn test_module_source_is_regenerable() {
        let (dir, config) = fixture();
        let report = discover(dir.path(), &config);

        let first = manifest_module_source(&report.manifest);
        let second = manifest_module_source(&discover(dir.path(), &config).manifest);
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_manifest_module() {
        let (dir, config) = fixture();
        let report = discover(dir.path(), &config);

        let path = write_manifest_module(&report.manifest, dir.path(), &config).unwrap();

        assert_eq!(path, dir.path().join("components/index.js"));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("export const registry"));
    }

    #[test]
    fn test_js_escape() {
        assert_eq!(js_escape("it's"), "it\\'s");
        assert_eq!(js_escape("a\\b"), "a\\\\b");
    }
}
