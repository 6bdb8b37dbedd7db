//! Runtime configuration management for `sitewright.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `[theme]`      | Theme directory layout and component convention  |
//! | `[generation]` | Generative backend budgets and creativity        |
//! | `[backup]`     | Snapshot location for pre-mutation backups       |
//! | `[extra]`      | User-defined custom fields                       |
//!
//! # Example
//!
//! ```toml
//! [theme]
//! root = "themes"
//! components_dir = "components"
//! component_ext = "jsx"
//!
//! [generation]
//! max_tokens = 2048
//! creativity = "balanced"
//!
//! [backup]
//! root = ".backups"
//! ```

mod error;

pub mod defaults;

pub use error::ConfigError;

use crate::generate::Creativity;
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing sitewright.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (set from CLI, not from the file)
    #[serde(skip)]
    pub root: PathBuf,

    /// Theme directory layout and component convention
    #[serde(default)]
    pub theme: ThemeConfig,

    /// Generative backend settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Backup snapshot settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl RuntimeConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Directory holding all theme directories.
    pub fn themes_root(&self) -> PathBuf {
        self.root.join(&self.theme.root)
    }

    /// Directory of a single theme.
    pub fn theme_dir(&self, theme_id: &str) -> PathBuf {
        self.themes_root().join(theme_id)
    }

    /// Root directory for backup snapshots.
    pub fn backups_root(&self) -> PathBuf {
        self.root.join(&self.backup.root)
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.theme.component_ext.is_empty() {
            return Err(ConfigError::Validation(
                "`theme.component_ext` must not be empty".to_owned(),
            ));
        }
        if self.theme.component_ext.starts_with('.') {
            return Err(ConfigError::Validation(
                "`theme.component_ext` must not include the leading dot".to_owned(),
            ));
        }
        if self.theme.content_marker.is_empty() {
            return Err(ConfigError::Validation(
                "`theme.content_marker` must not be empty".to_owned(),
            ));
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "`generation.timeout_secs` must be greater than zero".to_owned(),
            ));
        }
        if self.generation.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "`generation.max_tokens` must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// [theme] Section
// ============================================================================

/// `[theme]` section - theme directory layout and component convention.
///
/// # Example
/// ```toml
/// [theme]
/// root = "themes"
/// components_dir = "components"
/// component_ext = "jsx"
/// stylesheet = "theme.css"
/// manifest = "components/index.js"
/// content_marker = "page-content"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Directory containing all themes (relative to project root).
    #[serde(default = "defaults::theme::root")]
    #[educe(Default = defaults::theme::root())]
    pub root: PathBuf,

    /// Component directory inside a theme.
    #[serde(default = "defaults::theme::components_dir")]
    #[educe(Default = defaults::theme::components_dir())]
    pub components_dir: PathBuf,

    /// File extension of component source files (without the dot).
    #[serde(default = "defaults::theme::component_ext")]
    #[educe(Default = defaults::theme::component_ext())]
    pub component_ext: String,

    /// Theme stylesheet path inside a theme.
    #[serde(default = "defaults::theme::stylesheet")]
    #[educe(Default = defaults::theme::stylesheet())]
    pub stylesheet: PathBuf,

    /// Generated registration manifest path inside a theme.
    /// Derived artifact: regenerated on every discovery run.
    #[serde(default = "defaults::theme::manifest")]
    #[educe(Default = defaults::theme::manifest())]
    pub manifest: PathBuf,

    /// Reserved component type tag marking where page content is spliced
    /// into a page-body template.
    #[serde(default = "defaults::theme::content_marker")]
    #[educe(Default = defaults::theme::content_marker())]
    pub content_marker: String,
}

// ============================================================================
// [generation] Section
// ============================================================================

/// `[generation]` section - generative backend budgets.
///
/// # Example
/// ```toml
/// [generation]
/// model = "default"
/// max_tokens = 2048
/// timeout_secs = 90
/// creativity = "experimental"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Model identifier passed to the backend collaborator.
    #[serde(default = "defaults::generation::model")]
    #[educe(Default = defaults::generation::model())]
    pub model: String,

    /// Token budget per backend call.
    #[serde(default = "defaults::generation::max_tokens")]
    #[educe(Default = defaults::generation::max_tokens())]
    pub max_tokens: u32,

    /// Wall-clock budget per backend call, in seconds.
    /// A call exceeding it is treated as a failure, not left pending.
    #[serde(default = "defaults::generation::timeout_secs")]
    #[educe(Default = defaults::generation::timeout_secs())]
    pub timeout_secs: u64,

    /// Default creativity directive (affects tone/length, never token coverage).
    #[serde(default = "defaults::generation::creativity")]
    #[educe(Default = defaults::generation::creativity())]
    pub creativity: Creativity,
}

// ============================================================================
// [backup] Section
// ============================================================================

/// `[backup]` section - snapshot location.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Directory receiving backup snapshots (relative to project root).
    #[serde(default = "defaults::backup::root")]
    #[educe(Default = defaults::backup::root())]
    pub root: PathBuf,
}
