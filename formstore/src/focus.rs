//! Delayed focus settling.
//!
//! Blur and focus events of neighbouring inputs do not arrive atomically:
//! tabbing from A to B blurs A before B gains focus. A blur therefore only
//! clears form-level focus after a short delay, and only if no input took
//! focus in the meantime. The check re-reads the latest snapshot when it
//! fires, so a newer focus supersedes it without any cancellation.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::debug;

use crate::input::InputId;
use crate::store::FormStore;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after a delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed. Fire-and-forget.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Schedules onto the ambient tokio runtime.
///
/// Without a runtime the delay runs on a short-lived thread instead. A zero
/// delay runs the task immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        if delay.is_zero() {
            task();
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    task();
                });
            }
            Err(_) => {
                debug!("No tokio runtime, delaying task on a thread");
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    task();
                });
            }
        }
    }
}

/// Queues tasks until the owner runs them.
///
/// Suits synchronous event loops that poll for timers themselves, and tests.
#[derive(Default)]
pub struct ManualScheduler {
    pending: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Run every queued task in scheduling order, ignoring their delays.
    ///
    /// Tasks scheduled while running stay queued for the next call.
    pub fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((delay, task));
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Queue the settle check for an input that was just blurred.
///
/// The task only holds a weak handle; a dropped store is never kept alive
/// by a pending check.
pub(crate) fn schedule_settle(store: &FormStore, input_id: InputId, blurred_at: i64) {
    let config = store.config();
    if config.focus_settle_delay.is_zero() {
        store.settle_focus(input_id.as_str(), blurred_at);
        return;
    }
    let weak = store.downgrade();
    config.scheduler.schedule(
        config.focus_settle_delay,
        Box::new(move || {
            if let Some(store) = weak.upgrade() {
                store.settle_focus(input_id.as_str(), blurred_at);
            }
        }),
    );
}
