// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_APP_NAME: &str = "app";
pub const DEFAULT_OUTPUT: &str = "./";
pub const DEFAULT_EXTENSION: &str = ".go";
pub const DEFAULT_BUILD_TOOL: &str = "go";
pub const DEFAULT_BUILD_DELAY_MS: i64 = 5000;

/// Configuration exactly as read from `gowatch.yml` (or `.toml`).
///
/// ```yaml
/// app-name: api
/// output: ./bin
/// watch:
///   ext: [".go", ".tmpl"]
///   paths: ["../shared"]
///   vendor: false
///   exclude: ["./testdata"]
/// build:
///   delay: 1000
///   pkg: ./cmd/api
///   tags: dev
/// run:
///   auto-run: true
///   args: ["-port=8080"]
///   envs: ["APP_ENV=dev"]
/// ```
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    #[serde(rename = "app-name")]
    pub app_name: String,
    pub output: String,
    pub watch: WatchConfig,
    pub build: RawBuildConfig,
    pub run: RunConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            watch: WatchConfig::default(),
            build: RawBuildConfig::default(),
            run: RunConfig::default(),
        }
    }
}

/// `watch` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// File suffixes that trigger a build.
    pub ext: Vec<String>,
    /// Extra directories to watch, relative to the working directory.
    pub paths: Vec<String>,
    /// Whether `vendor` directories are watched.
    pub vendor: bool,
    /// Path prefixes that are never watched and never trigger a build.
    pub exclude: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            ext: vec![DEFAULT_EXTENSION.to_string()],
            paths: Vec::new(),
            vendor: false,
            exclude: Vec::new(),
        }
    }
}

/// `build` section as written in the file (`delay` in milliseconds).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawBuildConfig {
    pub tool: String,
    pub delay: i64,
    pub args: Vec<String>,
    pub pkg: String,
    pub tags: String,
}

impl Default for RawBuildConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_BUILD_TOOL.to_string(),
            delay: DEFAULT_BUILD_DELAY_MS,
            args: Vec::new(),
            pkg: String::new(),
            tags: String::new(),
        }
    }
}

/// `run` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Restart the program after every successful build.
    #[serde(rename = "auto-run")]
    pub auto_run: bool,
    pub args: Vec<String>,
    /// Extra `KEY=VALUE` entries appended to the inherited environment.
    pub envs: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            auto_run: true,
            args: Vec::new(),
            envs: Vec::new(),
        }
    }
}

impl RunConfig {
    /// `envs` split into key/value pairs. Entries without `=` are skipped;
    /// validation rejects them before a `Config` is built.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.envs
            .iter()
            .filter_map(|e| e.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Just the variable names, for logging.
    pub fn env_keys(&self) -> Vec<String> {
        self.env_pairs().into_iter().map(|(k, _)| k).collect()
    }
}

/// Resolved `build` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Build tool program, invoked as `<tool> build ...`.
    pub tool: String,
    /// Quiet period after the last change before a build starts.
    pub delay: Duration,
    pub args: Vec<String>,
    /// Comma-delimited package list; empty means the default package.
    pub pkg: String,
    pub tags: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_BUILD_TOOL.to_string(),
            delay: Duration::from_millis(DEFAULT_BUILD_DELAY_MS as u64),
            args: Vec::new(),
            pkg: String::new(),
            tags: String::new(),
        }
    }
}

impl BuildConfig {
    /// `pkg` split on commas, blank entries dropped.
    pub fn packages(&self) -> Vec<String> {
        self.pkg
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Fully resolved configuration consumed by the watcher.
///
/// Built from a [`RawConfig`] through `TryFrom` (see `validate.rs`), after
/// CLI overrides and normalization have been applied by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub app_name: String,
    /// Output directory, relative to the working directory unless absolute.
    pub output: PathBuf,
    pub watch: WatchConfig,
    pub build: BuildConfig,
    pub run: RunConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            watch: WatchConfig::default(),
            build: BuildConfig::default(),
            run: RunConfig::default(),
        }
    }
}
