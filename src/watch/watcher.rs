// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, Watcher as _};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::engine::{Debouncer, Pipeline, PipelineState};
use crate::errors::{GowatchError, Result};
use crate::fs::FileSystem;
use crate::watch::filter::{ChangeKind, EventFilter};
use crate::watch::path_utils::absolutize;
use crate::watch::patterns::IgnorePatterns;
use crate::watch::registry::{register_with, PathRegistry, RegistryOptions, WatchSet};

/// The orchestrator: owns the event source, the filter, the debouncer and
/// the build/restart pipeline.
///
/// Construction creates the event source; [`Watcher::start_watch`] registers
/// the watch set and starts the detection loop.
pub struct Watcher {
    work_dir: PathBuf,
    config: Config,
    fs: Arc<dyn FileSystem>,
    filter: Arc<EventFilter>,
    debouncer: Arc<Debouncer>,
    pipeline: Arc<Pipeline>,
    inner: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<Event>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("work_dir", &self.work_dir)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Create a watcher using the built-in ignore patterns.
    ///
    /// `work_dir` must be absolute; every relative path in `config` is
    /// resolved against it.
    pub fn new(work_dir: impl Into<PathBuf>, config: Config, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let ignore = IgnorePatterns::builtin()?;
        Self::with_ignore_patterns(work_dir, config, fs, ignore)
    }

    pub fn with_ignore_patterns(
        work_dir: impl Into<PathBuf>,
        config: Config,
        fs: Arc<dyn FileSystem>,
        ignore: IgnorePatterns,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        let filter = Arc::new(EventFilter::from_config(
            &work_dir,
            &config.watch,
            Arc::new(ignore),
        ));
        let debouncer = Arc::new(Debouncer::new(config.build.delay));
        let pipeline = Arc::new(Pipeline::new(&work_dir, &config));

        // Channels from the blocking notify callback into the async world.
        let (event_tx, events) = mpsc::unbounded_channel::<Event>();
        let (error_tx, errors) = mpsc::unbounded_channel::<notify::Error>();

        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let forwarded = match res {
                    Ok(event) => event_tx.send(event).is_ok(),
                    Err(err) => error_tx.send(err).is_ok(),
                };
                if !forwarded {
                    // We can't log via tracing here reliably once the loop is gone.
                    eprintln!("gowatch: detection loop stopped; dropping notify event");
                }
            },
            NotifyConfig::default(),
        )
        .map_err(GowatchError::WatchInit)?;

        Ok(Self {
            work_dir,
            config,
            fs,
            filter,
            debouncer,
            pipeline,
            inner,
            events,
            errors,
        })
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// The working directory plus every resolvable `watch.paths` entry.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.work_dir.clone()];
        for extra in &self.config.watch.paths {
            match absolutize(&self.work_dir, Path::new(extra)) {
                Some(abs) => roots.push(abs),
                None => warn!(path = %extra, "cannot resolve watch path; skipping"),
            }
        }
        roots
    }

    /// Register the watch set, start the detection loop and kick off the
    /// initial build.
    ///
    /// Fails if any directory of the watch set cannot be registered.
    pub fn start_watch(self) -> Result<WatcherHandle> {
        let roots = self.watch_roots();
        let Watcher {
            config,
            fs,
            filter,
            debouncer,
            pipeline,
            mut inner,
            events,
            errors,
            ..
        } = self;

        let options = RegistryOptions {
            vendor: config.watch.vendor,
            exclusions: filter.exclusions().clone(),
        };
        let watch_set = PathRegistry::new(fs.as_ref(), options).register_roots(&roots);
        register_with(&mut inner, &watch_set)?;
        info!(dirs = watch_set.len(), "file watcher started");

        pipeline.set_state(PipelineState::Watching);

        let dispatcher = Dispatcher::new(filter, debouncer, Arc::clone(&pipeline));
        let task = tokio::spawn(run_detection_loop(events, errors, dispatcher));

        // First build right away, without waiting for a change.
        let initial = Arc::clone(&pipeline);
        tokio::spawn(async move {
            initial.run_cycle().await;
        });

        Ok(WatcherHandle {
            _inner: inner,
            watch_set,
            pipeline,
            task,
        })
    }
}

/// Convenience: create a [`Watcher`] and start it.
pub fn spawn_watcher(
    work_dir: impl Into<PathBuf>,
    config: Config,
    fs: Arc<dyn FileSystem>,
) -> Result<WatcherHandle> {
    Watcher::new(work_dir, config, fs)?.start_watch()
}

/// Handle for a started watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping the handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watch_set: WatchSet,
    pipeline: Arc<Pipeline>,
    task: JoinHandle<Result<()>>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watch_set", &self.watch_set)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Wait for the detection loop. It only returns when the event source
    /// goes away, which is always an error.
    pub async fn wait(self) -> Result<()> {
        let WatcherHandle { _inner, task, .. } = self;
        match task.await {
            Ok(res) => res,
            Err(err) => Err(GowatchError::Other(anyhow!("detection loop panicked: {err}"))),
        }
    }
}

/// Turns raw events into debounced build cycles.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    filter: Arc<EventFilter>,
    debouncer: Arc<Debouncer>,
    pipeline: Arc<Pipeline>,
}

impl Dispatcher {
    pub fn new(filter: Arc<EventFilter>, debouncer: Arc<Debouncer>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            filter,
            debouncer,
            pipeline,
        }
    }

    /// Filter the paths of `event` and schedule a build for each
    /// interesting one. Returns how many paths qualified.
    pub fn dispatch(&self, event: &Event) -> usize {
        let kind = ChangeKind::classify(&event.kind);
        match kind {
            ChangeKind::Ignored => {
                debug!(kind = ?event.kind, paths = ?event.paths, "not a content change");
                return 0;
            }
            ChangeKind::Unknown => {
                warn!(kind = ?event.kind, paths = ?event.paths, "unknown file change kind");
            }
            _ => {}
        }

        let mut scheduled = 0;
        for path in &event.paths {
            if !self.filter.is_interesting(path) {
                trace!(path = ?path, "ignoring change");
                continue;
            }
            info!(path = ?path, kind = ?kind, "file changed");
            self.schedule_build();
            scheduled += 1;
        }
        scheduled
    }

    fn schedule_build(&self) {
        let generation = self.pipeline.schedule();
        let pipeline = Arc::clone(&self.pipeline);
        self.debouncer.trigger(move || async move {
            pipeline.run_scheduled(generation).await;
        });
    }
}

/// Consume change events and watcher errors until either stream closes.
///
/// Dispatch is sequential; builds run on their own tasks so a slow build
/// never blocks event consumption.
pub async fn run_detection_loop(
    mut events: mpsc::UnboundedReceiver<Event>,
    mut errors: mpsc::UnboundedReceiver<notify::Error>,
    dispatcher: Dispatcher,
) -> Result<()> {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    debug!(?event, "received notify event");
                    dispatcher.dispatch(&event);
                }
                None => break,
            },
            err = errors.recv() => match err {
                Some(err) => warn!(error = %err, "file watch error"),
                None => break,
            },
        }
    }

    error!("stopped watching files");
    Err(GowatchError::EventSourceClosed)
}
