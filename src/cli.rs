// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `gowatch`.
///
/// Flags override the corresponding keys of the config file.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "gowatch",
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None,
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Output directory for the built binary (default: `./`).
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: Option<String>,

    /// Packages to build, comma-delimited (e.g. `./cmd/api,./cmd/worker`).
    #[arg(short = 'p', long, value_name = "PKGS")]
    pub pkg: Option<String>,

    /// Extra arguments for the program, comma-delimited.
    ///
    /// Example: `--args=-port=8080,-name=demo`
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Print version information and exit.
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Path to the config file (YAML or TOML).
    ///
    /// Default: the first of `gowatch.yml`, `gowatch.yaml`, `gowatch.toml`
    /// found in the working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GOWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Run args from `--args`, split on commas.
    pub fn run_args(&self) -> Option<Vec<String>> {
        self.args
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(str::to_string).collect())
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

/// Version line printed for `-v` / `--version`.
pub fn version_string() -> String {
    format!("gowatch {}", env!("CARGO_PKG_VERSION"))
}
