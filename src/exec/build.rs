// src/exec/build.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::BuildConfig;

/// Extra environment for the build tool. Disabling the Go GC speeds up
/// short-lived compiler processes.
pub const BUILD_ENV: &[(&str, &str)] = &[("GOGC", "off")];

/// Where the build writes the binary: `<work_dir>/<output_dir>/<app_name>`,
/// with the platform executable suffix appended when missing.
pub fn output_path(work_dir: &Path, output_dir: &Path, app_name: &str) -> PathBuf {
    let dir = if output_dir.is_absolute() {
        output_dir.to_path_buf()
    } else {
        work_dir.join(output_dir)
    };
    let suffix = std::env::consts::EXE_SUFFIX;
    let mut file_name = app_name.to_string();
    if !suffix.is_empty() && !file_name.ends_with(suffix) {
        file_name.push_str(suffix);
    }
    crate::watch::path_utils::normalize(&dir.join(file_name))
}

/// A fully constructed build invocation:
/// `<tool> build -o <output> <args...> [-tags <tags>] [<pkg>...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    args: Vec<OsString>,
    work_dir: PathBuf,
}

impl BuildCommand {
    pub fn new(config: &BuildConfig, output: &Path, work_dir: &Path) -> Self {
        let mut args: Vec<OsString> = vec!["build".into(), "-o".into(), output.into()];
        args.extend(config.args.iter().map(OsString::from));
        if !config.tags.is_empty() {
            args.push("-tags".into());
            args.push(config.tags.clone().into());
        }
        args.extend(config.packages().into_iter().map(OsString::from));

        Self {
            program: config.tool.clone(),
            args,
            work_dir: work_dir.to_path_buf(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Command line for log output.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.work_dir)
            .envs(BUILD_ENV.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// Outcome of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Runs the build tool. Concurrent calls to [`BuildExecutor::run`] are
/// serialized: a second build waits for the first instead of being dropped.
#[derive(Debug)]
pub struct BuildExecutor {
    work_dir: PathBuf,
    lock: Mutex<()>,
}

impl BuildExecutor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn run(&self, config: &BuildConfig, output: &Path) -> BuildResult {
        let _guard = self.lock.lock().await;

        let command = BuildCommand::new(config, output, &self.work_dir);
        info!(cmd = %command.display(), "building");

        let started = Instant::now();
        let status = command.to_command().status().await;
        let duration = started.elapsed();

        let error = match status {
            Ok(status) if status.success() => None,
            Ok(status) => Some(match status.code() {
                Some(code) => format!("build exited with status {code}"),
                None => "build terminated by signal".to_string(),
            }),
            Err(err) => Some(format!("failed to launch `{}`: {err}", command.program())),
        };

        match error {
            None => {
                info!(
                    duration_ms = duration.as_millis() as u64,
                    output = ?output,
                    "build succeeded"
                );
                BuildResult {
                    success: true,
                    duration,
                    error: None,
                }
            }
            Some(error) => {
                warn!("==================== build failed ====================");
                warn!(
                    cmd = %command.display(),
                    duration_ms = duration.as_millis() as u64,
                    error = %error,
                    "build failed"
                );
                BuildResult {
                    success: false,
                    duration,
                    error: Some(error),
                }
            }
        }
    }
}
