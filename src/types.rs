// src/types.rs

use std::fmt;

/// Where the watch→build→restart pipeline currently is.
///
/// `Idle` until the watcher starts; afterwards every cycle returns
/// to `Watching`, or to `Debouncing` when another cycle is already
/// scheduled. Failures never leave it in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Watching,
    /// A qualifying change arrived; a build is scheduled after the quiet
    /// period.
    Debouncing,
    Building,
    BuildFailed,
    BuildSucceeded,
    Restarting,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "idle",
            PipelineState::Watching => "watching",
            PipelineState::Debouncing => "debouncing",
            PipelineState::Building => "building",
            PipelineState::BuildFailed => "build-failed",
            PipelineState::BuildSucceeded => "build-succeeded",
            PipelineState::Restarting => "restarting",
        };
        f.write_str(s)
    }
}
