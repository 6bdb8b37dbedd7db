//! Backup snapshots and the per-theme mutation lease.
//!
//! Every in-place theme mutation is preceded by a full recursive copy of
//! the theme directory. Snapshots are identified by a timestamp
//! (optionally correlated to a request id) and are never auto-restored;
//! restoration is an external, manual action.
//!
//! The lease keeps backup+mutate cycles mutually exclusive per theme
//! within this process, instead of relying on caller discipline.

use anyhow::{Context, Result, ensure};
use chrono::Local;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

// ============================================================================
// Backup snapshot
// ============================================================================

/// A completed pre-mutation copy of a theme directory.
#[derive(Debug, Clone)]
pub struct BackupSnapshot {
    /// Location of the snapshot:
    /// `<backups_root>/<theme_id>-backup[-<correlation>]-<timestamp>`.
    pub path: PathBuf,
}

impl BackupSnapshot {
    /// Take a full recursive snapshot of a theme directory.
    ///
    /// A partial copy left behind by a failure is removed before the
    /// error is returned; callers can rely on the snapshot being either
    /// complete or absent.
    pub fn create(
        theme_dir: &Path,
        backups_root: &Path,
        theme_id: &str,
        correlation: Option<&str>,
    ) -> Result<Self> {
        ensure!(
            theme_dir.is_dir(),
            "theme directory `{}` does not exist",
            theme_dir.display()
        );

        fs::create_dir_all(backups_root).with_context(|| {
            format!("failed to create backups root `{}`", backups_root.display())
        })?;

        let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
        let name = match correlation {
            Some(id) => format!("{theme_id}-backup-{id}-{stamp}"),
            None => format!("{theme_id}-backup-{stamp}"),
        };
        let dest = backups_root.join(name);

        if let Err(err) = copy_dir_recursive(theme_dir, &dest) {
            fs::remove_dir_all(&dest).ok();
            return Err(err);
        }

        Ok(Self { path: dest })
    }
}

/// Copy a directory tree recursively.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)
            .with_context(|| format!("failed to create directory `{}`", dst.display()))?;
    }

    for entry in fs::read_dir(src).with_context(|| format!("failed to read `{}`", src.display()))? {
        let entry = entry?;
        let entry_path = entry.path();
        let dest_path = dst.join(entry.file_name());

        if entry_path.is_dir() {
            copy_dir_recursive(&entry_path, &dest_path)?;
        } else {
            fs::copy(&entry_path, &dest_path).with_context(|| {
                format!("failed to copy `{}` to `{}`", entry_path.display(), dest_path.display())
            })?;
        }
    }

    Ok(())
}

// ============================================================================
// Mutation lease
// ============================================================================

/// Theme ids with a mutation in flight.
static ACTIVE: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Exclusive right to mutate one theme directory.
///
/// Held for the whole backup+apply cycle; released on drop.
#[derive(Debug)]
pub struct MutationLease {
    theme_id: String,
}

impl MutationLease {
    /// Acquire the lease for a theme, or `None` when another mutation is
    /// already in flight for it.
    pub fn try_acquire(theme_id: &str) -> Option<Self> {
        let mut active = ACTIVE.lock();
        if !active.insert(theme_id.to_owned()) {
            return None;
        }
        Some(Self {
            theme_id: theme_id.to_owned(),
        })
    }

    pub fn theme_id(&self) -> &str {
        &self.theme_id
    }
}

impl Drop for MutationLease {
    fn drop(&mut self) {
        ACTIVE.lock().remove(&self.theme_id);
    }
}
