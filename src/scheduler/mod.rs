//! Delayed continuations for the event loop
//!
//! Every timer in the site is a task spawned on the runtime that sleeps and
//! then posts a [`Fired`] message back to the loop. The scheduler keeps a table
//! of live tasks; a task is live from `schedule` until the loop accepts its
//! fire or it is cancelled. A fire that arrives for a task no longer in the
//! table is stale and dropped, so a cancel always wins even if the sleep had
//! already elapsed.

mod debounce;

pub use debounce::{Debouncer, Throttle};

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::error::{Error, Result};

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Message posted when a task's delay elapses
#[derive(Debug)]
pub struct Fired<K> {
    pub handle: TaskHandle,
    pub kind: K,
}

/// Table of pending delayed tasks
pub struct Scheduler<K> {
    tx: mpsc::UnboundedSender<Fired<K>>,
    live: HashMap<TaskHandle, JoinHandle<()>>,
    next_id: u64,
}

impl<K: fmt::Debug + Send + 'static> Scheduler<K> {
    /// Create a scheduler and the receiver its fires arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<K>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            live: HashMap::new(),
            next_id: 0,
        };
        (scheduler, rx)
    }

    /// Deliver `kind` after `delay`, measured from now
    ///
    /// Fails when called outside a tokio runtime.
    pub fn schedule(&mut self, kind: K, delay: Duration) -> Result<TaskHandle> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::scheduler(format!("Cannot schedule {:?}: {}", kind, e)))?;

        let handle = TaskHandle(self.next_id);
        self.next_id += 1;

        let deadline = Instant::now() + delay;
        let tx = self.tx.clone();
        trace!(task = %handle, kind = ?kind, delay_ms = delay.as_millis(), "Scheduling task");

        let join = runtime.spawn(async move {
            sleep_until(deadline).await;
            // A closed receiver means the loop is gone; nothing left to notify
            let _ = tx.send(Fired { handle, kind });
        });
        self.live.insert(handle, join);
        Ok(handle)
    }

    /// Cancel a task; false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.live.remove(&handle) {
            Some(join) => {
                join.abort();
                trace!(task = %handle, "Cancelled task");
                true
            },
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Number of live tasks
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    /// Retire a fired task, returning its kind unless it was cancelled
    pub fn accept(&mut self, fired: Fired<K>) -> Option<K> {
        match self.live.remove(&fired.handle) {
            Some(_) => Some(fired.kind),
            None => {
                trace!(task = %fired.handle, "Dropping stale fire");
                None
            },
        }
    }
}

impl<K> Scheduler<K> {
    /// Cancel every live task, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.live.len();
        for (_, join) in self.live.drain() {
            join.abort();
        }
        if cancelled > 0 {
            trace!(cancelled, "Cancelled all tasks");
        }
        cancelled
    }
}

impl<K> Drop for Scheduler<K> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
