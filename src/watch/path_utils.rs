// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base` and normalize it lexically.
///
/// Symlinks are not resolved and the path does not need to exist, so this
/// matches what the event source reports for paths under a watched root.
///
/// Returns `None` for an empty path, which has no absolute form.
pub fn absolutize(base: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    Some(normalize(&joined))
}

/// Remove `.` components and fold `..` into its parent, without touching the
/// filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Render a path with forward slashes for pattern matching.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
