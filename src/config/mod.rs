// src/config/mod.rs

//! Configuration loading and validation for gowatch.
//!
//! Responsibilities:
//! - Define the file-backed data model and the resolved `Config` (`model.rs`).
//! - Locate and parse the config file, apply CLI overrides (`loader.rs`).
//! - Validate the result (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_overrides, discover_config_path, load, load_from_path};
pub use model::{BuildConfig, Config, RawBuildConfig, RawConfig, RunConfig, WatchConfig};
