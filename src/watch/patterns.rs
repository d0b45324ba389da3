// src/watch/patterns.rs

use regex::Regex;

use crate::errors::{GowatchError, Result};

/// Junk files that never trigger a build, whatever their extension.
///
/// - `.#main.go`: emacs lock files
/// - `.main.go.swp` / `.swo`: vim swap files
/// - `main.go~`: editor backups
/// - `*.tmp`: temp files written by editors and tools
/// - `*.exe`: compiled binaries (the build output on Windows)
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    r"(^|[/\\])\.#[^/\\]+$",
    r"(^|[/\\])\.[^/\\]+\.sw[po]$",
    r"~$",
    r"\.tmp$",
    r"\.exe$",
];

/// Compiled ignore patterns, matched against the full event path.
///
/// Built once at startup and shared read-only by the event filter.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    regexes: Vec<Regex>,
}

impl IgnorePatterns {
    /// Compile the given patterns. A pattern that fails to compile is a
    /// setup error.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let regexes = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| GowatchError::IgnorePattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { regexes })
    }

    /// The built-in [`DEFAULT_IGNORE_PATTERNS`].
    pub fn builtin() -> Result<Self> {
        Self::compile(DEFAULT_IGNORE_PATTERNS)
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.regexes.iter().any(|r| r.is_match(path))
    }
}
