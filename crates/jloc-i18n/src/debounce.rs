//! Coalescing of rapid triggers into one delayed action

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Runs at most one pending action per key, after the key has been quiet for
/// the requested delay.
///
/// Each trigger aborts the key's previous timer and starts a new one. Timers
/// for different keys are independent. Actions run on tokio's blocking pool.
pub struct DebounceScheduler<K> {
    runtime: Handle,
    pending: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K> DebounceScheduler<K>
where
    K: Eq + Hash + Clone + fmt::Display + Send + 'static,
{
    /// Create a scheduler spawning its timers on `runtime`
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule `action` to run once `delay` has passed without another
    /// trigger for `key`.
    pub fn debounce<F>(&self, key: K, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock();

        if let Some(previous) = pending.remove(&key) {
            if !previous.is_finished() {
                debug!("Resetting pending action for {}", key);
            }
            previous.abort();
        }
        pending.retain(|_, task| !task.is_finished());

        let label = key.to_string();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            debug!("Running debounced action for {}", label);
            if let Err(e) = tokio::task::spawn_blocking(action).await {
                error!("Debounced action for {} did not complete: {}", label, e);
            }
        });

        pending.insert(key, task);
    }

    /// Cancel the pending action for `key`; true if one was still waiting
    pub fn cancel(&self, key: &K) -> bool {
        match self.pending.lock().remove(key) {
            Some(task) => {
                let waiting = !task.is_finished();
                task.abort();
                waiting
            }
            None => false,
        }
    }

    /// Cancel every pending action, returning the keys that were still waiting
    pub fn drain_pending(&self) -> Vec<K> {
        let mut pending = self.pending.lock();
        let mut waiting = Vec::new();
        for (key, task) in pending.drain() {
            if !task.is_finished() {
                waiting.push(key);
            }
            task.abort();
        }
        waiting
    }

    /// Cancel every pending action, returning how many were still waiting
    pub fn cancel_all(&self) -> usize {
        self.drain_pending().len()
    }

    /// Number of actions that have not completed yet
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }
}

impl<K> fmt::Debug for DebounceScheduler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceScheduler")
            .field("pending", &self.pending.lock().len())
            .finish()
    }
}
