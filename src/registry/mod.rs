//! Component discovery and the theme-scoped registry.
//!
//! This module turns a theme's component directory into a manifest:
//!
//! ```text
//! discover() ──► DiscoveryReport
//!                    │
//!                    ├── manifest: RegistrySnapshot (type tag -> renderer + meta)
//!                    ├── skipped:  eligible files without a declaration
//!                    ├── errors:   per-file failures (never abort the scan)
//!                    └── warnings: empty theme, duplicate type tags, ...
//! ```
//!
//! The snapshot is immutable. Concurrent readers hold it through
//! [`SharedRegistry`], which swaps in a freshly built snapshot atomically
//! so no reader ever observes a half-built registry.

pub mod manifest;
pub mod meta;

use crate::config::ThemeConfig;
use anyhow::Result;
use arc_swap::ArcSwap;
use educe::Educe;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use walkdir::WalkDir;

/// Props map handed to a component at render time.
pub type Props = serde_json::Map<String, Value>;

/// Render function stored next to each manifest entry.
pub type RenderFn = fn(&ComponentMeta, &Props) -> String;

// ============================================================================
// Theme metadata
// ============================================================================

/// File holding a theme's descriptive metadata.
const THEME_META_FILE: &str = "theme.toml";

/// Descriptive metadata of a theme.
///
/// Loaded from `theme.toml` when present; inferred defaults otherwise.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
pub struct ThemeMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub author: String,

    #[educe(Default = "0.1.0".to_string())]
    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: String,
}

impl ThemeMeta {
    /// Load theme metadata, falling back to inferred defaults.
    ///
    /// A missing file is normal; a malformed one yields defaults plus a
    /// warning pushed by the caller (discovery treats it as non-fatal).
    fn load(theme_dir: &Path) -> Result<Self, String> {
        let path = theme_dir.join(THEME_META_FILE);
        let mut meta = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|err| format!("failed to read `{THEME_META_FILE}`: {err}"))?;
            toml::from_str(&content)
                .map_err(|err| format!("malformed `{THEME_META_FILE}`: {err}"))?
        } else {
            Self::default()
        };

        if meta.name.is_empty() {
            meta.name = theme_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unnamed".to_owned());
        }
        if meta.version.is_empty() {
            meta.version = "0.1.0".to_owned();
        }

        Ok(meta)
    }
}

// ============================================================================
// Component metadata
// ============================================================================

/// Whether a component sits at the top level of the component directory
/// or in a subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Main,
    Sub,
}

/// Declarative metadata of one renderable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentMeta {
    /// Unique type tag within the theme.
    pub type_tag: String,
    /// Display name (humanized type tag when not declared).
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    /// Source path relative to the component directory.
    pub source: PathBuf,
    pub kind: ComponentKind,
}

// ============================================================================
// Registry snapshot
// ============================================================================

/// One manifest entry: render function plus metadata.
#[derive(Clone)]
pub struct RegistryEntry {
    pub meta: ComponentMeta,
    pub render: RenderFn,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Immutable type-tag -> entry manifest for one theme.
///
/// Entries are keyed in a `BTreeMap`, so iteration order is deterministic
/// regardless of directory-walk order.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: BTreeMap<String, RegistryEntry>,
}

impl RegistrySnapshot {
    /// Build a snapshot directly from component metadata, using the
    /// default renderer. Discovery is the usual constructor; this suits
    /// embedders assembling a manifest from their own source of truth.
    ///
    /// A duplicate type tag keeps the entry given last, same as discovery.
    pub fn from_metas(metas: impl IntoIterator<Item = ComponentMeta>) -> Self {
        let entries = metas
            .into_iter()
            .map(|meta| {
                (
                    meta.type_tag.clone(),
                    RegistryEntry {
                        meta,
                        render: default_render,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Look up a component by type tag.
    pub fn get(&self, type_tag: &str) -> Option<&RegistryEntry> {
        self.entries.get(type_tag)
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.entries.contains_key(type_tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in type-tag order.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// All type tags in deterministic order.
    pub fn type_tags(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Components in a category, in type-tag order.
    pub fn by_category(&self, category: &str) -> Vec<&ComponentMeta> {
        self.entries
            .values()
            .map(|entry| &entry.meta)
            .filter(|meta| meta.category == category)
            .collect()
    }

    /// Main (top-level) components.
    pub fn main_components(&self) -> Vec<&ComponentMeta> {
        self.of_kind(ComponentKind::Main)
    }

    /// Sub-components (declared in subdirectories).
    pub fn sub_components(&self) -> Vec<&ComponentMeta> {
        self.of_kind(ComponentKind::Sub)
    }

    fn of_kind(&self, kind: ComponentKind) -> Vec<&ComponentMeta> {
        self.entries
            .values()
            .map(|entry| &entry.meta)
            .filter(|meta| meta.kind == kind)
            .collect()
    }
}

/// Shared handle over the current registry snapshot.
///
/// Discovery rebuilds a full snapshot and swaps it in atomically; readers
/// keep rendering against whichever snapshot they loaded.
#[derive(Debug)]
pub struct SharedRegistry {
    inner: ArcSwap<RegistrySnapshot>,
}

impl SharedRegistry {
    pub fn new(snapshot: RegistrySnapshot) -> Self {
        Self {
            inner: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Load the current snapshot.
    pub fn load(&self) -> Arc<RegistrySnapshot> {
        self.inner.load_full()
    }

    /// Publish a rebuilt snapshot.
    pub fn swap(&self, snapshot: RegistrySnapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(RegistrySnapshot::default())
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// Per-file discovery failure. Recorded, never fatal to the scan.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("invalid metadata in `{0}`: {1}")]
    Meta(PathBuf, String),
}

/// Result of scanning one theme directory.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Theme-level descriptive metadata.
    pub theme: ThemeMeta,
    /// Type tag -> (renderer, metadata) manifest.
    pub manifest: RegistrySnapshot,
    /// Eligible files without a metadata declaration.
    pub skipped: Vec<PathBuf>,
    /// Per-file read/parse failures.
    pub errors: Vec<DiscoveryError>,
    /// Non-fatal conditions: empty theme, duplicate type tags, ...
    pub warnings: Vec<String>,
}

/// Scan a theme directory and build its component manifest.
///
/// Walk order is sorted by file name, so re-running against an unchanged
/// directory yields an equivalent manifest. Files at the top level of the
/// component directory register as main components, files in
/// subdirectories as sub-components.
///
/// A duplicate type tag keeps the entry scanned last and reports the
/// collision as a warning naming both files.
pub fn discover(theme_dir: &Path, config: &ThemeConfig) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();

    match ThemeMeta::load(theme_dir) {
        Ok(meta) => report.theme = meta,
        Err(warning) => {
            report.warnings.push(warning);
            report.theme = ThemeMeta::load_defaults(theme_dir);
        }
    }

    let components_dir = theme_dir.join(&config.components_dir);
    if !components_dir.is_dir() {
        report.warnings.push(format!(
            "theme `{}` has no `{}` directory; manifest is empty",
            report.theme.name,
            config.components_dir.display()
        ));
        return report;
    }

    // Collect eligible files in deterministic walk order.
    let files: Vec<PathBuf> = WalkDir::new(&components_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == config.component_ext.as_str())
        })
        .collect();

    // Read and parse in parallel; fold sequentially in walk order so
    // "last scanned wins" stays deterministic.
    let parsed: Vec<_> = files
        .par_iter()
        .map(|path| parse_component_file(path, &components_dir))
        .collect();

    let mut entries: BTreeMap<String, RegistryEntry> = BTreeMap::new();
    for result in parsed {
        match result {
            Ok(ParsedFile::Component(meta)) => {
                if let Some(previous) = entries.get(&meta.type_tag) {
                    report.warnings.push(format!(
                        "duplicate component type `{}`: `{}` overrides `{}`",
                        meta.type_tag,
                        meta.source.display(),
                        previous.meta.source.display()
                    ));
                }
                entries.insert(
                    meta.type_tag.clone(),
                    RegistryEntry {
                        meta,
                        render: default_render,
                    },
                );
            }
            Ok(ParsedFile::Skipped(path)) => report.skipped.push(path),
            Err(err) => report.errors.push(err),
        }
    }

    if entries.is_empty() {
        report.warnings.push(format!(
            "theme `{}` registered no components",
            report.theme.name
        ));
    }

    report.manifest = RegistrySnapshot { entries };
    report
}

impl ThemeMeta {
    /// Inferred defaults only, used after a metadata load failure.
    fn load_defaults(theme_dir: &Path) -> Self {
        let mut meta = Self::default();
        meta.name = theme_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_owned());
        meta.version = "0.1.0".to_owned();
        meta
    }
}

/// Outcome of parsing one eligible file.
enum ParsedFile {
    Component(ComponentMeta),
    Skipped(PathBuf),
}

fn parse_component_file(path: &Path, components_dir: &Path) -> Result<ParsedFile, DiscoveryError> {
    let relative = path
        .strip_prefix(components_dir)
        .unwrap_or(path)
        .to_path_buf();

    let source = fs::read_to_string(path)
        .map_err(|err| DiscoveryError::Read(relative.clone(), err))?;

    let fields = match meta::parse_meta(&source) {
        Ok(Some(fields)) => fields,
        Ok(None) => return Ok(ParsedFile::Skipped(relative)),
        Err(message) => return Err(DiscoveryError::Meta(relative, message)),
    };

    let kind = if relative.parent().is_some_and(|p| p.as_os_str().is_empty()) {
        ComponentKind::Main
    } else {
        ComponentKind::Sub
    };

    Ok(ParsedFile::Component(ComponentMeta {
        name: fields
            .name
            .unwrap_or_else(|| meta::humanize(&fields.type_tag)),
        description: fields.description.unwrap_or_default(),
        icon: fields.icon.unwrap_or_else(|| "box".to_owned()),
        type_tag: fields.type_tag,
        category: fields.category,
        source: relative,
        kind,
    }))
}

// ============================================================================
// Default renderer
// ============================================================================

/// Default render function: an HTML element stub carrying the component's
/// type tag and props as data attributes.
pub fn default_render(meta: &ComponentMeta, props: &Props) -> String {
    let mut attrs = String::new();
    for (key, value) in props {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        attrs.push_str(&format!(
            " data-{}=\"{}\"",
            escape_attr(key),
            escape_attr(&value)
        ));
    }
    format!(
        "<section class=\"cmp cmp-{tag}\" data-component=\"{tag}\"{attrs}></section>",
        tag = escape_attr(&meta.type_tag)
    )
}

/// Escape a string for use inside an HTML attribute value.
pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
