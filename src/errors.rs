// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GowatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    #[error("invalid ignore pattern `{pattern}`: {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to create filesystem watcher: {0}")]
    WatchInit(#[source] notify::Error),

    #[error("failed to watch directory {path:?}: {source}")]
    WatchRegister {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("filesystem event source closed")]
    EventSourceClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GowatchError>;
