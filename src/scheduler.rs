//! Periodic task scheduling.
//!
//! The pool never owns a thread of its own. Heartbeat work is handed to a
//! [`Scheduler`], which runs it with a fixed delay between the end of one
//! run and the start of the next, and returns a [`CancelHandle`].

use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::error::PoolError;

/// A unit of periodic work. Each call produces one run.
pub type ScheduledTask = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send>;

/// Runs tasks periodically.
pub trait Scheduler: Send + Sync {
    /// Run `task` every `interval`, measured from the end of the previous run.
    fn schedule_with_fixed_delay(
        &self,
        task: ScheduledTask,
        interval: Duration,
    ) -> Box<dyn CancelHandle>;
}

/// Stops a scheduled task.
pub trait CancelHandle: Send + Sync {
    /// Prevent further runs. A run already in progress completes.
    fn cancel(&self);
}

/// Scheduler backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Use the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self, PoolError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| PoolError::ServiceUnavailable(format!("no tokio runtime available: {}", e)))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_with_fixed_delay(
        &self,
        mut task: ScheduledTask,
        interval: Duration,
    ) -> Box<dyn CancelHandle> {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        self.handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    // Fires on cancel and when the handle is dropped.
                    _ = cancel_rx.changed() => break,
                }
                if *cancel_rx.borrow() {
                    break;
                }
                task().await;
            }
            tracing::debug!("Scheduled task stopped");
        });

        Box::new(WatchCancelHandle { tx: cancel_tx })
    }
}

struct WatchCancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle for WatchCancelHandle {
    fn cancel(&self) {
        self.tx.send_replace(true);
    }
}
