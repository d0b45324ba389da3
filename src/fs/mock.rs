// src/fs/mock.rs

use super::{DirEntry, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    unreadable: HashSet<PathBuf>,
}

/// In-memory filesystem for tests.
///
/// Paths are stored exactly as given, so tests should use absolute paths
/// (e.g. `/work/src/main.go`). Parent directories are created implicitly.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state();
        state.entries.insert(path.clone(), MockEntry::File(content.into()));
        if let Some(parent) = path.parent() {
            ensure_dir_entry(&mut state.entries, parent);
            link_child(&mut state.entries, parent, &path);
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Make `read_dir` fail for this directory (it still reports `is_dir`).
    pub fn deny_read(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state();
        ensure_dir_entry(&mut state.entries, &path);
        state.unreadable.insert(path);
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
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        entries.get_mut(parent),
        child.file_name().and_then(|n| n.to_str()),
    ) {
        if !children.iter().any(|c| c == name) {
            children.push(name.to_string());
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state();
        match state.entries.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.state().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let state = self.state();
        if state.unreadable.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                let mut entries: Vec<DirEntry> = children
                    .iter()
                    .map(|name| {
                        let child = path.join(name);
                        let is_dir = matches!(state.entries.get(&child), Some(MockEntry::Dir(_)));
                        DirEntry { path: child, is_dir }
                    })
                    .collect();
                entries.sort_by(|a, b| a.path.cmp(&b.path));
                Ok(entries)
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
