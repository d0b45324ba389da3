// src/exec/supervisor.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::config::RunConfig;

/// What happened to the previous process during a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    /// No process was held.
    NotRunning,
    /// The process had already exited on its own.
    AlreadyExited(Option<i32>),
    /// The process was alive and has been killed.
    Killed,
    /// Querying or killing the process failed. The handle is dropped anyway.
    Failed(String),
}

/// Result of [`ProcessSupervisor::restart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartOutcome {
    pub kill: KillOutcome,
    /// Pid of the new process, `None` if it failed to start.
    pub pid: Option<u32>,
}

/// Owns the single supervised process.
///
/// The handle lock is held across kill and start, so the old process has
/// exited before the new one is spawned and two restarts never interleave.
#[derive(Debug)]
pub struct ProcessSupervisor {
    work_dir: PathBuf,
    child: Mutex<Option<Child>>,
}

impl ProcessSupervisor {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            child: Mutex::new(None),
        }
    }

    /// Kill the current process (if any) and start `binary` in its place.
    pub async fn restart(&self, run: &RunConfig, binary: &Path) -> RestartOutcome {
        info!(app = ?binary, "restarting target program");
        let mut slot = self.child.lock().await;
        let kill = kill_child(&mut slot).await;
        let pid = self.start_child(&mut slot, run, binary);
        RestartOutcome { kill, pid }
    }

    /// Kill the current process, if any.
    pub async fn kill(&self) -> KillOutcome {
        let mut slot = self.child.lock().await;
        kill_child(&mut slot).await
    }

    /// Pid of the held process, if any.
    pub async fn pid(&self) -> Option<u32> {
        self.child.lock().await.as_ref().and_then(Child::id)
    }

    /// Whether a process is held and still alive.
    pub async fn is_running(&self) -> bool {
        match self.child.lock().await.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn start_child(&self, slot: &mut Option<Child>, run: &RunConfig, binary: &Path) -> Option<u32> {
        let env_keys = run.env_keys();
        info!(
            app = ?binary,
            args = ?run.args,
            env_keys = ?env_keys,
            "starting target program"
        );

        let mut cmd = Command::new(binary);
        cmd.args(&run.args)
            .envs(run.env_pairs())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        match cmd.spawn() {
            Ok(child) => {
                let pid = child.id();
                info!(app = ?binary, pid = ?pid, "target program started");
                *slot = Some(child);
                pid
            }
            Err(err) => {
                error!(
                    app = ?binary,
                    args = ?run.args,
                    env_keys = ?env_keys,
                    error = %err,
                    "failed to start target program"
                );
                *slot = None;
                None
            }
        }
    }
}

async fn kill_child(slot: &mut Option<Child>) -> KillOutcome {
    let Some(mut child) = slot.take() else {
        return KillOutcome::NotRunning;
    };
    let pid = child.id();

    let outcome = match child.try_wait() {
        Ok(Some(status)) => KillOutcome::AlreadyExited(status.code()),
        Ok(None) => match child.kill().await {
            Ok(()) => KillOutcome::Killed,
            Err(err) => KillOutcome::Failed(err.to_string()),
        },
        Err(err) => KillOutcome::Failed(err.to_string()),
    };

    match &outcome {
        KillOutcome::Killed => info!(pid = ?pid, "stopped previous process"),
        KillOutcome::AlreadyExited(code) => {
            info!(pid = ?pid, exit_code = ?code, "previous process had already exited")
        }
        KillOutcome::Failed(reason) => {
            error!(pid = ?pid, error = %reason, "failed to stop previous process")
        }
        KillOutcome::NotRunning => {}
    }

    outcome
}
