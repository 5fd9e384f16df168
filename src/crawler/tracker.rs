//! Outstanding-task accounting for crawl termination
//!
//! Every task is counted before it is spawned and uncounted exactly once when
//! its guard drops. The parent holds its own guard while spawning children,
//! so the count can only reach zero once, after the last descendant ends.

use crate::state::TaskState;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts of tasks by the state they ended in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskTally {
    pub depth_exhausted: u64,
    pub already_claimed: u64,
    pub failed: u64,
    pub fetched: u64,
    /// Tasks whose guard dropped before reaching a terminal state (a panic)
    pub abandoned: u64,
}

impl TaskTally {
    /// Total number of tasks that ran
    pub fn total(&self) -> u64 {
        self.depth_exhausted + self.already_claimed + self.failed + self.fetched + self.abandoned
    }

    /// Number of results emitted into the stream
    pub fn results(&self) -> u64 {
        self.failed + self.fetched
    }
}

#[derive(Debug, Default)]
struct AtomicTally {
    depth_exhausted: AtomicU64,
    already_claimed: AtomicU64,
    failed: AtomicU64,
    fetched: AtomicU64,
    abandoned: AtomicU64,
}

impl AtomicTally {
    fn record(&self, state: TaskState) {
        let counter = match state {
            TaskState::DepthExhausted => &self.depth_exhausted,
            TaskState::AlreadyClaimed => &self.already_claimed,
            TaskState::Failed => &self.failed,
            TaskState::Fetched => &self.fetched,
            _ => &self.abandoned,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TaskTally {
        TaskTally {
            depth_exhausted: self.depth_exhausted.load(Ordering::Relaxed),
            already_claimed: self.already_claimed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Shared outstanding-task counter with an idle signal
#[derive(Debug, Default)]
pub struct TaskTracker {
    outstanding: AtomicUsize,
    idle: Notify,
    tally: AtomicTally,
}

impl TaskTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counts a new task; must be called before the task is spawned
    pub fn enter(self: &Arc<Self>) -> TaskGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            tracker: Arc::clone(self),
            state: TaskState::Spawned,
        }
    }

    /// Number of tasks counted but not yet finished
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Terminal-state counts recorded so far
    pub fn tally(&self) -> TaskTally {
        self.tally.snapshot()
    }

    /// Waits until no task is outstanding
    ///
    /// Returns immediately if nothing was ever entered.
    pub async fn wait_idle(&self) {
        loop {
            if self.outstanding() == 0 {
                return;
            }
            // notify_one keeps a permit when nobody is waiting yet, so a
            // transition to zero between the check and the await is not lost
            self.idle.notified().await;
        }
    }

    fn leave(&self, state: TaskState) {
        self.tally.record(state);
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_one();
        }
    }
}

/// Marks one outstanding task; uncounts it when dropped
#[derive(Debug)]
pub struct TaskGuard {
    tracker: Arc<TaskTracker>,
    state: TaskState,
}

impl TaskGuard {
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Moves the task to its next state
    pub fn advance(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid task transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.tracker.leave(self.state);
    }
}
