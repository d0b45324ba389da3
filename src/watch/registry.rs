// src/watch/registry.rs

//! Discovery of the directories to watch.
//!
//! The event source is registered per directory (non-recursively), so the
//! registry walks each root once at startup and records every directory that
//! passes the skip rules. The resulting [`WatchSet`] is fixed for the rest of
//! the process lifetime.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::{RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::errors::{GowatchError, Result};
use crate::fs::FileSystem;
use crate::watch::filter::ExclusionRules;

/// Name of the dependency directory skipped unless vendor watching is on.
pub const VENDOR_DIR: &str = "vendor";

/// Absolute directory paths registered with the event source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    dirs: BTreeSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    fn insert(&mut self, dir: PathBuf) -> bool {
        self.dirs.insert(dir)
    }

    fn merge(&mut self, other: WatchSet) {
        self.dirs.extend(other.dirs);
    }
}

/// Skip rules applied while walking.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Descend into `vendor` directories.
    pub vendor: bool,
    pub exclusions: ExclusionRules,
}

/// Walks source trees and collects the directories to watch.
#[derive(Debug)]
pub struct PathRegistry<'a> {
    fs: &'a dyn FileSystem,
    options: RegistryOptions,
}

impl<'a> PathRegistry<'a> {
    pub fn new(fs: &'a dyn FileSystem, options: RegistryOptions) -> Self {
        Self { fs, options }
    }

    /// Walk `root` depth-first and return every watchable directory.
    ///
    /// `root` must already be absolute. It is added itself if it is a
    /// readable directory; unreadable subdirectories are logged and skipped
    /// together with everything beneath them.
    pub fn register_tree(&self, root: &Path) -> WatchSet {
        let mut set = WatchSet::new();
        if !self.fs.is_dir(root) {
            warn!(directory = ?root, "watch root is not a directory; skipping");
            return set;
        }
        self.walk(root, &mut set);
        set
    }

    /// Walk several roots and merge the results.
    pub fn register_roots<P: AsRef<Path>>(&self, roots: &[P]) -> WatchSet {
        let mut set = WatchSet::new();
        for root in roots {
            set.merge(self.register_tree(root.as_ref()));
        }
        set
    }

    fn walk(&self, dir: &Path, set: &mut WatchSet) {
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(directory = ?dir, error = %err, "failed to read directory; skipping subtree");
                return;
            }
        };

        if !set.insert(dir.to_path_buf()) {
            // Already visited.
            return;
        }

        for entry in entries {
            if !entry.is_dir {
                continue;
            }
            let name = entry.name();
            if name.starts_with('.') {
                debug!(directory = ?entry.path, "skipping hidden directory");
                continue;
            }
            if !self.options.vendor && name == VENDOR_DIR {
                debug!(directory = ?entry.path, "skipping vendor directory");
                continue;
            }
            if self.options.exclusions.is_excluded(&entry.path) {
                debug!(directory = ?entry.path, "skipping excluded directory");
                continue;
            }
            self.walk(&entry.path, set);
        }
    }
}

/// Register every directory of `set` with the event source.
///
/// Failing to watch any one directory is fatal: the caller asked for it.
pub fn register_with<W: Watcher>(watcher: &mut W, set: &WatchSet) -> Result<()> {
    for dir in set.iter() {
        info!(path = ?dir, "watching directory");
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| GowatchError::WatchRegister {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}
