// src/exec/mod.rs

//! Process execution layer.
//!
//! Both external commands run through `tokio::process::Command` with the
//! parent's stdout/stderr inherited:
//!
//! - [`build`] runs the build tool, one build at a time.
//! - [`supervisor`] owns the single long-running target process and
//!   replaces it after each successful build.

pub mod build;
pub mod supervisor;

pub use build::{output_path, BuildCommand, BuildExecutor, BuildResult};
pub use supervisor::{KillOutcome, ProcessSupervisor, RestartOutcome};
