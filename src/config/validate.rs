// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{BuildConfig, Config, RawConfig};
use crate::errors::{GowatchError, Result};

impl TryFrom<RawConfig> for Config {
    type Error = GowatchError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let RawConfig {
            app_name,
            output,
            watch,
            build,
            run,
        } = raw;

        Ok(Config {
            app_name,
            output: PathBuf::from(output),
            watch,
            build: BuildConfig {
                tool: build.tool,
                delay: Duration::from_millis(build.delay as u64),
                args: build.args,
                pkg: build.pkg,
                tags: build.tags,
            },
            run,
        })
    }
}

fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    validate_app(cfg)?;
    validate_watch(cfg)?;
    validate_build(cfg)?;
    validate_run(cfg)?;
    Ok(())
}

fn validate_app(cfg: &RawConfig) -> Result<()> {
    if cfg.app_name.trim().is_empty() {
        return Err(GowatchError::ConfigError(
            "`app-name` must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfig) -> Result<()> {
    if cfg.watch.ext.is_empty() {
        return Err(GowatchError::ConfigError(
            "`watch.ext` must list at least one file extension".to_string(),
        ));
    }
    // An empty suffix would match every file, including the build output.
    if cfg.watch.ext.iter().any(|e| e.is_empty()) {
        return Err(GowatchError::ConfigError(
            "`watch.ext` entries must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_build(cfg: &RawConfig) -> Result<()> {
    if cfg.build.tool.trim().is_empty() {
        return Err(GowatchError::ConfigError(
            "`build.tool` must not be empty".to_string(),
        ));
    }
    if cfg.build.delay < 0 {
        return Err(GowatchError::ConfigError(format!(
            "`build.delay` must be >= 0 (got {})",
            cfg.build.delay
        )));
    }
    Ok(())
}

fn validate_run(cfg: &RawConfig) -> Result<()> {
    for entry in cfg.run.envs.iter() {
        match entry.split_once('=') {
            Some((key, _)) if !key.is_empty() => {}
            _ => {
                return Err(GowatchError::ConfigError(format!(
                    "`run.envs` entry '{}' must have the form KEY=VALUE",
                    entry
                )));
            }
        }
    }
    Ok(())
}
