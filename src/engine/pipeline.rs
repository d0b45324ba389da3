// src/engine/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::{BuildConfig, Config, RunConfig};
use crate::exec::{output_path, BuildExecutor, BuildResult, ProcessSupervisor, RestartOutcome};
use crate::types::PipelineState;

/// Result of one build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The build failed; the running program (if any) was left alone.
    BuildFailed(BuildResult),
    /// The build succeeded and auto-run is off.
    Built(BuildResult),
    /// The build succeeded and the program was restarted.
    Restarted {
        build: BuildResult,
        restart: RestartOutcome,
    },
}

/// The debounced action: build, then restart on success.
///
/// Shared (behind an `Arc`) between the detection loop and every cycle in
/// flight. Builds are serialized by the [`BuildExecutor`]; restarts by the
/// [`ProcessSupervisor`].
#[derive(Debug)]
pub struct Pipeline {
    builder: BuildExecutor,
    supervisor: ProcessSupervisor,
    build: BuildConfig,
    run: RunConfig,
    binary: PathBuf,
    state: watch::Sender<PipelineState>,
    /// Bumped by every [`Pipeline::schedule`]. Only updated under the state
    /// channel's lock, together with the state it publishes.
    scheduled: AtomicU64,
}

impl Pipeline {
    pub fn new(work_dir: &Path, config: &Config) -> Self {
        let binary = output_path(work_dir, &config.output, &config.app_name);
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            builder: BuildExecutor::new(work_dir),
            supervisor: ProcessSupervisor::new(work_dir),
            build: config.build.clone(),
            run: config.run.clone(),
            binary,
            state,
            scheduled: AtomicU64::new(0),
        }
    }

    /// Path of the binary produced by the build.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn set_state(&self, next: PipelineState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "pipeline state");
        }
    }

    /// Record that a debounced cycle has been requested and publish
    /// [`PipelineState::Debouncing`]. Returns the generation to hand to
    /// [`Pipeline::run_scheduled`] once the quiet period is over.
    pub fn schedule(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.scheduled.fetch_add(1, Ordering::SeqCst) + 1;
            if *state != PipelineState::Debouncing {
                debug!(from = %state, to = %PipelineState::Debouncing, "pipeline state");
            }
            *state = PipelineState::Debouncing;
        });
        generation
    }

    /// Run a cycle that was not requested through [`Pipeline::schedule`]
    /// (the initial build).
    pub async fn run_cycle(&self) -> CycleOutcome {
        let generation = self.scheduled.load(Ordering::SeqCst);
        self.run_scheduled(generation).await
    }

    /// Build once and, on success with auto-run enabled, restart the
    /// program.
    ///
    /// Ends in [`PipelineState::Watching`], or in
    /// [`PipelineState::Debouncing`] if another cycle was scheduled after
    /// `generation` while this one ran.
    pub async fn run_scheduled(&self, generation: u64) -> CycleOutcome {
        self.set_state(PipelineState::Building);
        let build = self.builder.run(&self.build, &self.binary).await;

        if !build.success {
            self.set_state(PipelineState::BuildFailed);
            self.finish(generation);
            return CycleOutcome::BuildFailed(build);
        }

        self.set_state(PipelineState::BuildSucceeded);

        let outcome = if self.run.auto_run {
            self.set_state(PipelineState::Restarting);
            let restart = self.supervisor.restart(&self.run, &self.binary).await;
            CycleOutcome::Restarted { build, restart }
        } else {
            info!(output = ?self.binary, "auto-run disabled; not starting program");
            CycleOutcome::Built(build)
        };

        self.finish(generation);
        outcome
    }

    fn finish(&self, generation: u64) {
        self.state.send_modify(|state| {
            let next = if self.scheduled.load(Ordering::SeqCst) > generation {
                PipelineState::Debouncing
            } else {
                PipelineState::Watching
            };
            if *state != next {
                debug!(from = %state, to = %next, "pipeline state");
            }
            *state = next;
        });
    }
}
