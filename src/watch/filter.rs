// src/watch/filter.rs

//! Decide which filesystem events are worth a rebuild.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::EventKind;
use notify::event::{AccessKind, AccessMode};
use tracing::warn;

use crate::config::WatchConfig;
use crate::watch::path_utils::{absolutize, slash_str};
use crate::watch::patterns::IgnorePatterns;

/// Path prefixes (absolute) that are never watched and never trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    rules: Vec<PathBuf>,
}

impl ExclusionRules {
    /// Resolve raw exclusion entries against `work_dir`.
    ///
    /// An entry without an absolute form is logged and skipped.
    pub fn resolve<S: AsRef<str>>(work_dir: &Path, raw: &[S]) -> Self {
        let mut rules = Vec::with_capacity(raw.len());
        for entry in raw {
            let entry = entry.as_ref();
            match absolutize(work_dir, Path::new(entry)) {
                Some(abs) => rules.push(abs),
                None => warn!(exclude = %entry, "cannot resolve exclusion path; skipping rule"),
            }
        }
        Self { rules }
    }

    /// True if the absolute `path` is at or below any rule.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| path.starts_with(rule))
    }
}

/// How the detection loop treats a raw event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Remove,
    /// Not a content change (e.g. a file opened for reading).
    Ignored,
    /// Kind the backend could not classify; still filtered like a change.
    Unknown,
}

impl ChangeKind {
    pub fn classify(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            EventKind::Modify(_) => ChangeKind::Modify,
            EventKind::Remove(_) => ChangeKind::Remove,
            EventKind::Access(AccessKind::Close(AccessMode::Write)) => ChangeKind::Modify,
            EventKind::Access(_) => ChangeKind::Ignored,
            EventKind::Any | EventKind::Other => ChangeKind::Unknown,
        }
    }
}

/// Filter deciding whether a changed path should schedule a build.
///
/// Checks, in order: ignore patterns, exclusion rules, extension allowlist.
#[derive(Debug, Clone)]
pub struct EventFilter {
    work_dir: PathBuf,
    ignore: Arc<IgnorePatterns>,
    exclusions: ExclusionRules,
    extensions: Vec<String>,
}

impl EventFilter {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        ignore: Arc<IgnorePatterns>,
        exclusions: ExclusionRules,
        extensions: Vec<String>,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            ignore,
            exclusions,
            extensions,
        }
    }

    /// Build a filter from the `watch` section; exclusions resolve against
    /// `work_dir`.
    pub fn from_config(work_dir: &Path, watch: &WatchConfig, ignore: Arc<IgnorePatterns>) -> Self {
        let exclusions = ExclusionRules::resolve(work_dir, &watch.exclude);
        Self::new(work_dir, ignore, exclusions, watch.ext.clone())
    }

    pub fn exclusions(&self) -> &ExclusionRules {
        &self.exclusions
    }

    pub fn is_interesting(&self, path: &Path) -> bool {
        let display = slash_str(path);

        if self.ignore.is_ignored(&display) {
            return false;
        }

        match absolutize(&self.work_dir, path) {
            Some(abs) if self.exclusions.is_excluded(&abs) => return false,
            Some(_) => {}
            None => return false,
        }

        self.extensions.iter().any(|ext| display.ends_with(ext.as_str()))
    }
}
