//! Typed failures for the generation pipeline.
//!
//! Callers receive either a complete result or one of these errors.
//! Selection and content synthesis degrade deterministically and never
//! surface here; whole-theme generation and apply have no safe fallback,
//! so their failures are typed. Partially-substituted or half-applied
//! output is never surfaced as a success.

use std::path::PathBuf;
use thiserror::Error;

/// Generation pipeline errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no template candidates available for component generation")]
    NoCandidates,

    #[error("theme generation call failed: {0}")]
    ThemeBackend(String),

    #[error("theme generation call timed out after {0}s")]
    ThemeTimeout(u64),

    #[error("no structured data could be recovered from the theme generation response")]
    ThemeParse,

    #[error("source contains tokens absent from the content map: {tokens:?}")]
    IncompleteContent { tokens: Vec<String> },

    #[error("generated file path `{0}` escapes the theme directory")]
    UnsafePath(PathBuf),

    #[error("another mutation is already in flight for theme `{0}`")]
    ThemeBusy(String),

    #[error("backup snapshot failed for theme `{theme}`, no files were touched")]
    Backup {
        theme: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("staging failed for theme `{theme}`, live files were not touched")]
    Stage {
        theme: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "apply failed after {applied} of {total} files; \
         the theme directory is in a mixed state, snapshot kept at `{backup}`"
    )]
    Apply {
        applied: usize,
        total: usize,
        backup: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_names_budget() {
        let display = GenerateError::ThemeTimeout(60).to_string();
        assert!(display.contains("theme generation"));
        assert!(display.contains("60"));
    }

    #[test]
    fn test_apply_error_reports_mixed_state() {
        let err = GenerateError::Apply {
            applied: 2,
            total: 5,
            backup: PathBuf::from(".backups/aurora-backup-20250101000000"),
            source: anyhow::anyhow!("disk full"),
        };
        let display = err.to_string();
        assert!(display.contains("2 of 5"));
        assert!(display.contains("mixed state"));
        assert!(display.contains("aurora-backup"));
    }
}
