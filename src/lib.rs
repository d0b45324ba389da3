// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::Watcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the watch set and the `notify` event source
/// - the debounced build / restart pipeline
///
/// It only returns on a fatal error: the daemon runs until killed.
pub async fn run(args: CliArgs) -> Result<()> {
    let work_dir = std::env::current_dir()?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let cfg = config::load(fs.as_ref(), &work_dir, &args)?;
    info!(
        app = %cfg.app_name,
        output = ?cfg.output,
        ext = ?cfg.watch.ext,
        delay_ms = cfg.build.delay.as_millis() as u64,
        auto_run = cfg.run.auto_run,
        "configuration resolved"
    );

    let watcher = Watcher::new(work_dir, cfg, fs)?;
    let handle = watcher.start_watch()?;
    handle.wait().await
}
