// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod bulk;
pub mod mock;

pub use bulk::{delete_all, remove_if_exists, DeletionFailure, DeletionSummary, FileRemoval};

/// What a directory entry is, looked up without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Symlink,
    Dir,
    /// Sockets, FIFOs, devices.
    Other,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Return a list of entries in a directory.
    /// Returns full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn entry_kind(&self, path: &Path) -> Result<EntryKind>;

    /// True if something (including a dangling symlink) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file or the symlink itself (never its target).
    fn remove_file(&self, path: &Path) -> Result<()>;

    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry of {:?}", path))?;
            entries.push(entry.path());
        }
        Ok(entries)
    }

    fn entry_kind(&self, path: &Path) -> Result<EntryKind> {
        let meta =
            fs::symlink_metadata(path).with_context(|| format!("inspecting {:?}", path))?;
        let ty = meta.file_type();
        let kind = if ty.is_symlink() {
            EntryKind::Symlink
        } else if ty.is_dir() {
            EntryKind::Dir
        } else if ty.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Ok(kind)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            // Directory symlinks on Windows are removed with `remove_dir`.
            Err(_) if cfg!(windows) && path.is_dir() => {
                fs::remove_dir(path).with_context(|| format!("removing link {:?}", path))
            }
            Err(e) => Err(e).with_context(|| format!("removing file {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).with_context(|| format!("removing dir {:?}", path))
    }
}
