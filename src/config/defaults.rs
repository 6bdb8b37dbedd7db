//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

#[allow(unused)]
pub fn r#false() -> bool {
    false
}

// ============================================================================
// [theme] Section Defaults
// ============================================================================

pub mod theme {
    use std::path::PathBuf;

    pub fn root() -> PathBuf {
        "themes".into()
    }

    pub fn components_dir() -> PathBuf {
        "components".into()
    }

    pub fn component_ext() -> String {
        "jsx".into()
    }

    pub fn stylesheet() -> PathBuf {
        "theme.css".into()
    }

    pub fn manifest() -> PathBuf {
        "components/index.js".into()
    }

    pub fn content_marker() -> String {
        "page-content".into()
    }
}

// ============================================================================
// [generation] Section Defaults
// ============================================================================

pub mod generation {
    use crate::generate::Creativity;

    pub fn model() -> String {
        "default".into()
    }

    pub fn max_tokens() -> u32 {
        1024
    }

    pub fn timeout_secs() -> u64 {
        60
    }

    pub fn creativity() -> Creativity {
        Creativity::default()
    }
}

// ============================================================================
// [backup] Section Defaults
// ============================================================================

pub mod backup {
    use std::path::PathBuf;

    pub fn root() -> PathBuf {
        ".backups".into()
    }
}
