// src/engine/debouncer.rs

//! Trailing-edge debouncing of change notifications.
//!
//! Saving a file often produces several events in a few milliseconds (and
//! editors that format on save produce more). The debouncer turns such a
//! burst into exactly one action, fired once the quiet period has elapsed
//! after the last event.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Delays an action until no new trigger has arrived for `delay`.
///
/// At most one timer is armed at any time; a new [`trigger`](Self::trigger)
/// aborts the armed timer and replaces it. When a timer fires, the action is
/// spawned on its own task, so a later trigger never interrupts an action
/// that is already running.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` to run `delay` from now, superseding any action
    /// scheduled by an earlier call that has not fired yet.
    pub fn trigger<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                debug!(delay_ms = self.delay.as_millis() as u64, "rescheduling pending action");
                previous.abort();
            }
        }

        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(action());
        }));
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}
