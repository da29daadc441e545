// src/fs/mock.rs

use super::{EntryKind, FileSystem};
use anyhow::{anyhow, bail, Result};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
    Symlink(PathBuf),
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Paths whose removal fails with a simulated permission error.
    locked: HashSet<PathBuf>,
    /// Paths that are seen by `exists` but gone by the time of removal.
    vanishing: HashSet<PathBuf>,
}

/// In-memory filesystem for tests, with injectable removal failures.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert(path.as_ref(), MockEntry::File(content.into()));
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        ensure_dir_entry(&mut state.entries, path);
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        self.insert(path.as_ref(), MockEntry::Symlink(target.into()));
    }

    /// Make every later removal of `path` (or of a directory containing it)
    /// fail as if access were denied.
    pub fn lock_path(&self, path: impl AsRef<Path>) {
        self.lock().locked.insert(path.as_ref().to_path_buf());
    }

    /// Report `path` as present once, then have its removal find nothing,
    /// as if another process deleted it in between.
    pub fn vanish_on_remove(&self, path: impl AsRef<Path>) {
        self.lock().vanishing.insert(path.as_ref().to_path_buf());
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            ensure_dir_entry(&mut state.entries, parent);
            link_child(&mut state.entries, parent, path);
        }
        state.entries.insert(path.to_path_buf(), entry);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not poison every other assertion.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    if let Some(parent) = path.parent() {
        if parent != path && !parent.as_os_str().is_empty() {
            ensure_dir_entry(entries, parent);
            link_child(entries, parent, path);
        }
    }
}

fn link_child(entries: &mut HashMap<PathBuf, MockEntry>, parent: &Path, child: &Path) {
    if let (Some(MockEntry::Dir(children)), Some(name)) =
        (entries.get_mut(parent), child.file_name().and_then(|n| n.to_str()))
    {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

fn unlink_child(entries: &mut HashMap<PathBuf, MockEntry>, child: &Path) {
    let (Some(parent), Some(name)) = (child.parent(), child.file_name().and_then(|n| n.to_str()))
    else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        children.retain(|c| c != name);
    }
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }

    fn entry_kind(&self, path: &Path) -> Result<EntryKind> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File(_)) => Ok(EntryKind::File),
            Some(MockEntry::Dir(_)) => Ok(EntryKind::Dir),
            Some(MockEntry::Symlink(_)) => Ok(EntryKind::Symlink),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.entries.contains_key(path) || state.vanishing.contains(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        if state.locked.contains(path) {
            bail!("Permission denied: {:?}", path);
        }
        state.vanishing.remove(path);
        match state.entries.get(path) {
            Some(MockEntry::File(_)) | Some(MockEntry::Symlink(_)) => {}
            Some(MockEntry::Dir(_)) => bail!("Is a directory: {:?}", path),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("File not found: {:?}", path),
                )
                .into());
            }
        }
        state.entries.remove(path);
        unlink_child(&mut state.entries, path);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        if !matches!(state.entries.get(path), Some(MockEntry::Dir(_))) {
            bail!("Not a directory or not found: {:?}", path);
        }
        if let Some(locked) = state.locked.iter().find(|p| p.starts_with(path)) {
            bail!("Permission denied: {:?}", locked);
        }
        state.entries.retain(|p, _| !p.starts_with(path));
        unlink_child(&mut state.entries, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_dir_drops_descendants() {
        let fs = MockFileSystem::new();
        fs.add_file("/tmp/a/b/c.txt", b"c".to_vec());
        fs.add_file("/tmp/keep.txt", b"k".to_vec());

        fs.remove_dir_all(Path::new("/tmp/a")).unwrap();

        assert!(!fs.exists(Path::new("/tmp/a/b/c.txt")));
        assert_eq!(
            fs.read_dir(Path::new("/tmp")).unwrap(),
            vec![PathBuf::from("/tmp/keep.txt")]
        );
    }

    #[test]
    fn locked_descendant_blocks_dir_removal() {
        let fs = MockFileSystem::new();
        fs.add_file("/tmp/a/in-use.log", b"x".to_vec());
        fs.lock_path("/tmp/a/in-use.log");

        assert!(fs.remove_dir_all(Path::new("/tmp/a")).is_err());
        assert!(fs.exists(Path::new("/tmp/a/in-use.log")));
    }
}
