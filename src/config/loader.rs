// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::model::{
    Config, RawConfig, DEFAULT_APP_NAME, DEFAULT_BUILD_DELAY_MS, DEFAULT_EXTENSION, DEFAULT_OUTPUT,
};
use crate::errors::{GowatchError, Result};
use crate::fs::FileSystem;

/// File names probed in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["gowatch.yml", "gowatch.yaml", "gowatch.toml"];

/// Load a configuration file from a given path and return the raw
/// `RawConfig`.
///
/// The format is chosen by extension: `.toml` is parsed as TOML, anything
/// else as YAML. An empty file yields the defaults.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    if contents.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: RawConfig = if is_toml {
        toml::from_str(&contents)?
    } else {
        serde_yaml_ng::from_str(&contents)?
    };

    Ok(config)
}

/// First of [`DEFAULT_CONFIG_FILES`] that exists under `work_dir`.
pub fn discover_config_path(fs: &dyn FileSystem, work_dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| work_dir.join(name))
        .find(|p| fs.is_file(p))
}

/// Load, override, normalize and validate the configuration.
///
/// This is the entry point used by `run`:
///
/// - `--config` if given (it must exist), otherwise the first default file
///   found in `work_dir`, otherwise built-in defaults.
/// - CLI flags override file values (see [`apply_overrides`]).
/// - The result is validated into a [`Config`].
pub fn load(fs: &dyn FileSystem, work_dir: &Path, cli: &CliArgs) -> Result<Config> {
    let raw = match &cli.config {
        Some(explicit) => {
            let path = if explicit.is_absolute() {
                explicit.clone()
            } else {
                work_dir.join(explicit)
            };
            if !fs.is_file(&path) {
                return Err(GowatchError::ConfigError(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            info!(filename = ?path, "loaded config file");
            load_from_path(fs, &path)?
        }
        None => match discover_config_path(fs, work_dir) {
            Some(path) => {
                info!(filename = ?path, "loaded config file");
                load_from_path(fs, &path)?
            }
            None => {
                info!(dir = ?work_dir, "no config file found; using defaults");
                RawConfig::default()
            }
        },
    };

    let raw = apply_overrides(fs, work_dir, raw, cli);
    Config::try_from(raw)
}

/// Apply CLI overrides and fill in defaults for unusable values.
///
/// - empty `app-name` -> `app`
/// - `-o` replaces `output`; an output that is not an existing directory
///   falls back to `./`
/// - `--args` replaces `run.args`
/// - negative `build.delay` -> 5000
/// - `-p` replaces `build.pkg`
/// - empty `watch.ext` -> `[".go"]`
pub fn apply_overrides(
    fs: &dyn FileSystem,
    work_dir: &Path,
    mut raw: RawConfig,
    cli: &CliArgs,
) -> RawConfig {
    if raw.app_name.trim().is_empty() {
        raw.app_name = DEFAULT_APP_NAME.to_string();
    }

    if let Some(output) = cli.output.as_deref().filter(|o| !o.is_empty()) {
        raw.output = output.to_string();
    }
    let output_dir = {
        let p = Path::new(&raw.output);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        }
    };
    if !fs.is_dir(&output_dir) {
        warn!(
            output = %raw.output,
            "output directory does not exist; falling back to {DEFAULT_OUTPUT}"
        );
        raw.output = DEFAULT_OUTPUT.to_string();
    }

    if let Some(args) = cli.run_args() {
        raw.run.args = args;
    }

    if raw.build.delay < 0 {
        warn!(delay = raw.build.delay, "negative build delay; using default");
        raw.build.delay = DEFAULT_BUILD_DELAY_MS;
    }

    if let Some(pkg) = cli.pkg.as_deref().filter(|p| !p.is_empty()) {
        raw.build.pkg = pkg.to_string();
    }

    if raw.watch.ext.is_empty() {
        raw.watch.ext = vec![DEFAULT_EXTENSION.to_string()];
    }

    raw
}
