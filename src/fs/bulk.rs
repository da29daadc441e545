// src/fs/bulk.rs

//! Bulk deletion of a directory's immediate children.
//!
//! Per-item failures are collected, never fatal; only failing to list the
//! root directory aborts the operation.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::{EntryKind, FileSystem};

/// One item that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a [`delete_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// In visiting order.
    pub failures: Vec<DeletionFailure>,
}

/// Outcome of [`remove_if_exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRemoval {
    Removed,
    Absent,
}

/// Remove every immediate child of `dir`.
///
/// Files and symlinks are unlinked (a symlink's target is left alone);
/// directories are removed recursively. Returns `Err` only when `dir` itself
/// cannot be listed, in which case nothing was attempted.
pub fn delete_all(fs: &dyn FileSystem, dir: &Path) -> Result<DeletionSummary> {
    let children = fs
        .read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?;

    let mut summary = DeletionSummary::default();

    for child in children {
        summary.attempted += 1;
        match remove_entry(fs, &child) {
            Ok(()) => {
                debug!(path = %child.display(), "deleted");
                summary.succeeded += 1;
            }
            Err(err) => {
                warn!(path = %child.display(), error = %err, "could not delete item");
                summary.failed += 1;
                summary.failures.push(DeletionFailure {
                    path: child,
                    reason: format!("{err:#}"),
                });
            }
        }
    }

    Ok(summary)
}

fn remove_entry(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    match fs.entry_kind(path)? {
        EntryKind::Dir => fs.remove_dir_all(path),
        EntryKind::File | EntryKind::Symlink | EntryKind::Other => fs.remove_file(path),
    }
}

/// Delete a single file if it is there. Absence is not an error, including
/// a file that disappears between the check and the removal.
pub fn remove_if_exists(fs: &dyn FileSystem, path: &Path) -> Result<FileRemoval> {
    if !fs.exists(path) {
        return Ok(FileRemoval::Absent);
    }
    match fs.remove_file(path) {
        Ok(()) => Ok(FileRemoval::Removed),
        Err(err) if is_not_found(&err) => {
            debug!(path = %path.display(), "vanished before removal");
            Ok(FileRemoval::Absent)
        }
        Err(err) => Err(err),
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn empty_directory_is_a_successful_noop() {
        let fs = MockFileSystem::new();
        fs.add_dir("/cache");

        let summary = delete_all(&fs, Path::new("/cache")).unwrap();
        assert_eq!(summary, DeletionSummary::default());
    }

    #[test]
    fn missing_root_is_an_error() {
        let fs = MockFileSystem::new();
        assert!(delete_all(&fs, Path::new("/nope")).is_err());
    }

    #[test]
    fn symlink_is_unlinked_without_touching_target() {
        let fs = MockFileSystem::new();
        fs.add_file("/keep/precious.txt", b"data".to_vec());
        fs.add_symlink("/cache/link", "/keep");

        let summary = delete_all(&fs, Path::new("/cache")).unwrap();

        assert_eq!(summary.succeeded, 1);
        assert!(!fs.exists(Path::new("/cache/link")));
        assert!(fs.exists(Path::new("/keep/precious.txt")));
    }

    #[test]
    fn remove_if_exists_reports_absence() {
        let fs = MockFileSystem::new();
        fs.add_file("/home/IconCache.db", b"icons".to_vec());

        let path = Path::new("/home/IconCache.db");
        assert_eq!(remove_if_exists(&fs, path).unwrap(), FileRemoval::Removed);
        assert_eq!(remove_if_exists(&fs, path).unwrap(), FileRemoval::Absent);
    }

    #[test]
    fn remove_if_exists_surfaces_failures() {
        let fs = MockFileSystem::new();
        fs.add_file("/home/IconCache.db", b"icons".to_vec());
        fs.lock_path("/home/IconCache.db");

        assert!(remove_if_exists(&fs, Path::new("/home/IconCache.db")).is_err());
    }

    #[test]
    fn file_removed_concurrently_counts_as_absent() {
        let fs = MockFileSystem::new();
        fs.vanish_on_remove("/home/IconCache.db");

        assert_eq!(
            remove_if_exists(&fs, Path::new("/home/IconCache.db")).unwrap(),
            FileRemoval::Absent
        );
    }

    #[test]
    fn real_not_found_is_recognised_through_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = crate::fs::RealFileSystem
            .remove_file(&dir.path().join("gone.db"))
            .unwrap_err();
        assert!(is_not_found(&err));
    }
}
