//! FIFO hand-off between producer threads and the consumer.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::entry::LogEntry;

struct QueueState {
    entries: VecDeque<LogEntry>,
    running: bool,
}

/// Unbounded FIFO of entries, guarded by one mutex and one condition
/// variable.
///
/// The running flag lives under the same mutex as the entries, so a
/// producer can never observe "running" and then append after the final
/// drain has already run.
pub struct MessageQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl MessageQueue {
    /// Creates an empty, running queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                entries: VecDeque::new(),
                running: true,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `entry` and wakes the consumer.
    ///
    /// # Errors
    ///
    /// Once the queue has been stopped nothing will consume it, so the entry
    /// is handed back for the caller to persist another way.
    pub fn enqueue(&self, entry: LogEntry) -> Result<(), LogEntry> {
        let mut state = self.lock();
        if !state.running {
            return Err(entry);
        }
        state.entries.push_back(entry);
        drop(state);
        self.ready.notify_one();
        Ok(())
    }

    /// Blocks until entries are available, then takes all of them.
    ///
    /// Returns `None` once the queue is stopped and empty; the consumer
    /// exits on that signal.
    pub fn wait_batch(&self) -> Option<Vec<LogEntry>> {
        let state = self.lock();
        let mut state = self
            .ready
            .wait_while(state, |state| state.entries.is_empty() && state.running)
            .unwrap_or_else(PoisonError::into_inner);

        if state.entries.is_empty() {
            return None;
        }
        Some(mem::take(&mut state.entries).into())
    }

    /// Clears the running flag and wakes every waiter. Irreversible.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        let was_running = mem::replace(&mut state.running, false);
        drop(state);
        self.ready.notify_all();
        was_running
    }

    /// Takes whatever is still queued.
    pub fn drain(&self) -> Vec<LogEntry> {
        mem::take(&mut self.lock().entries).into()
    }

    /// Whether the queue still accepts entries.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}
