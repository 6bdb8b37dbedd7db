//! Safe whole-theme mutation.
//!
//! A theme-level generation result carries complete file bodies keyed by
//! relative path. Applying it:
//!
//! 1. acquires the theme's mutation lease (fail fast when busy),
//! 2. takes a full backup snapshot (failure aborts before any write),
//! 3. stages every file body in a temporary directory,
//! 4. only then copies the staged files into the live theme directory.
//!
//! Staging approximates atomicity: a malformed result cannot half-write
//! the live directory. Per-file copies in step 4 are still independent;
//! a failure there leaves a mixed old/new state that is reported, not
//! rolled back.

use crate::backup::{BackupSnapshot, MutationLease};
use crate::error::GenerateError;
use crate::log;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Outcome of a successful apply.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Snapshot taken before the first write.
    pub backup: PathBuf,
    /// Live paths written, in apply order.
    pub written: Vec<PathBuf>,
}

/// Apply generated file bodies to a live theme directory.
pub fn apply_theme_files(
    theme_dir: &Path,
    theme_id: &str,
    files: &BTreeMap<String, String>,
    backups_root: &Path,
    correlation: Option<&str>,
) -> Result<ApplyReport, GenerateError> {
    let _lease = MutationLease::try_acquire(theme_id)
        .ok_or_else(|| GenerateError::ThemeBusy(theme_id.to_owned()))?;

    // Reject escaping paths before anything touches the disk.
    for rel in files.keys() {
        validate_rel_path(rel)?;
    }

    let snapshot = BackupSnapshot::create(theme_dir, backups_root, theme_id, correlation)
        .map_err(|source| GenerateError::Backup {
            theme: theme_id.to_owned(),
            source,
        })?;
    log!("backup"; "snapshot taken at `{}`", snapshot.path.display());

    let staging = backups_root.join(format!(
        ".staging-{theme_id}-{}",
        Local::now().format("%Y%m%d%H%M%S%3f")
    ));
    if let Err(source) = stage_files(&staging, files) {
        fs::remove_dir_all(&staging).ok();
        return Err(GenerateError::Stage {
            theme: theme_id.to_owned(),
            source,
        });
    }

    // Every body staged successfully; promote into the live directory.
    let mut written = Vec::with_capacity(files.len());
    for (index, rel) in files.keys().enumerate() {
        if let Err(source) = promote_file(&staging, theme_dir, rel) {
            fs::remove_dir_all(&staging).ok();
            return Err(GenerateError::Apply {
                applied: index,
                total: files.len(),
                backup: snapshot.path,
                source,
            });
        }
        written.push(theme_dir.join(rel));
    }

    fs::remove_dir_all(&staging).ok();
    log!("generate"; "applied {} files to theme `{theme_id}`", written.len());

    Ok(ApplyReport {
        backup: snapshot.path,
        written,
    })
}

/// A generated path must stay inside the theme directory.
fn validate_rel_path(rel: &str) -> Result<(), GenerateError> {
    let path = Path::new(rel);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes || rel.is_empty() {
        return Err(GenerateError::UnsafePath(path.to_path_buf()));
    }
    Ok(())
}

/// Write every file body under the staging directory.
fn stage_files(staging: &Path, files: &BTreeMap<String, String>) -> Result<()> {
    for (rel, body) in files {
        let path = staging.join(rel);
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("staged path `{rel}` has no parent"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
        fs::write(&path, body)
            .with_context(|| format!("failed to stage `{rel}`"))?;
    }
    Ok(())
}

/// Copy one staged file into the live theme directory, overwriting.
fn promote_file(staging: &Path, theme_dir: &Path, rel: &str) -> Result<()> {
    let dest = theme_dir.join(rel);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    fs::copy(staging.join(rel), &dest)
        .with_context(|| format!("failed to write `{}`", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn theme_fixture(id: &str) -> (TempDir, PathBuf) {
        let root = TempDir::new().unwrap();
        let theme = root.path().join(id);
        fs::create_dir_all(theme.join("components")).unwrap();
        fs::write(theme.join("theme.css"), "body { color: black; }\n").unwrap();
        fs::write(theme.join("components/Hero.jsx"), "old hero\n").unwrap();
        (root, theme)
    }

    fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_apply_overwrites_and_creates() {
        let (_root, theme) = theme_fixture("apply-basic");
        let backups = TempDir::new().unwrap();

        let report = apply_theme_files(
            &theme,
            "apply-basic",
            &files(&[
                ("components/Hero.jsx", "new hero\n"),
                ("components/cards/Card.jsx", "new card\n"),
                ("theme.css", "body { color: teal; }\n"),
            ]),
            backups.path(),
            Some("req-7"),
        )
        .unwrap();

        assert_eq!(report.written.len(), 3);
        assert_eq!(
            fs::read_to_string(theme.join("components/Hero.jsx")).unwrap(),
            "new hero\n"
        );
        assert_eq!(
            fs::read_to_string(theme.join("components/cards/Card.jsx")).unwrap(),
            "new card\n"
        );

        // Snapshot preserves the pre-mutation bodies.
        assert!(report.backup.exists());
        assert_eq!(
            fs::read_to_string(report.backup.join("components/Hero.jsx")).unwrap(),
            "old hero\n"
        );

        // Staging directory is gone.
        assert!(
            fs::read_dir(backups.path())
                .unwrap()
                .filter_map(Result::ok)
                .all(|e| !e.file_name().to_string_lossy().starts_with(".staging"))
        );
    }

    #[test]
    fn test_backup_failure_touches_no_live_file() {
        let (_root, theme) = theme_fixture("apply-backup-fail");
        // A file where the backups root should be makes snapshotting fail.
        let blocker = TempDir::new().unwrap();
        let backups_root = blocker.path().join("not-a-dir");
        fs::write(&backups_root, "occupied").unwrap();

        let err = apply_theme_files(
            &theme,
            "apply-backup-fail",
            &files(&[("theme.css", "body { color: red; }\n")]),
            &backups_root,
            None,
        )
        .unwrap_err();

        assert!(matches!(err, GenerateError::Backup { .. }));
        assert_eq!(
            fs::read_to_string(theme.join("theme.css")).unwrap(),
            "body { color: black; }\n"
        );
    }

    #[test]
    fn test_escaping_paths_are_rejected_before_backup() {
        let (_root, theme) = theme_fixture("apply-escape");
        let backups = TempDir::new().unwrap();

        let err = apply_theme_files(
            &theme,
            "apply-escape",
            &files(&[("../evil.js", "boom")]),
            backups.path(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, GenerateError::UnsafePath(_)));
        // No snapshot was taken.
        assert_eq!(fs::read_dir(backups.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_absolute_paths_are_rejected() {
        let (_root, theme) = theme_fixture("apply-absolute");
        let backups = TempDir::new().unwrap();

        let err = apply_theme_files(
            &theme,
            "apply-absolute",
            &files(&[("/etc/owned", "boom")]),
            backups.path(),
            None,
        )
        .unwrap_err();

        assert!(matches!(err, GenerateError::UnsafePath(_)));
    }

    #[test]
    fn test_busy_theme_is_refused() {
        let (_root, theme) = theme_fixture("apply-busy");
        let backups = TempDir::new().unwrap();
        let lease = MutationLease::try_acquire("apply-busy").unwrap();

        let err = apply_theme_files(
            &theme,
            "apply-busy",
            &files(&[("theme.css", "x")]),
            backups.path(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::ThemeBusy(_)));

        drop(lease);
        assert!(
            apply_theme_files(
                &theme,
                "apply-busy",
                &files(&[("theme.css", "body {}\n")]),
                backups.path(),
                None,
            )
            .is_ok()
        );
    }
}
