//! # TaskQueue: single-worker sequential task execution.
//!
//! Runs submitted [`SequencedTask`]s strictly one at a time, preserving
//! submission order. The worker is a single spawned loop; because only it
//! drives task bodies, no two bodies can ever overlap.
//!
//! ## Execution contract
//! ```text
//! add(task) ──► [unbounded queue] ──► worker loop {
//!                                       recv next task
//!                                       ├─ deadline passed? ──► expiry callback, advance
//!                                       └─ else ──► drive body future to completion, advance
//!                                     }
//! ```
//! - The worker does not inspect a body's outcome; completion of the future
//!   (of any kind) advances the queue. A task that wants to report failure
//!   must do so itself through whatever channel it captured.
//!
//! ## Cancellation
//! - [`TaskQueue::cancel`] stops the worker at the next safe point: between
//!   tasks, or mid-task by dropping the in-flight body future.
//! - Pending tasks are dropped unrun, which releases everything their closures
//!   captured (senders close, `Arc`s release).
//! - Tasks submitted after cancellation are dropped immediately.
//! - `cancel()` is idempotent.

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::task::SequencedTask;

/// Sequential task queue with per-task deadlines.
///
/// Cloning is intentionally not provided; the owner decides when to cancel.
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<SequencedTask>,
    cancel: CancellationToken,
}

impl TaskQueue {
    /// Creates the queue and spawns its worker.
    ///
    /// Must be called within a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(worker(rx, cancel.clone()));
        Self { tx, cancel }
    }

    /// Enqueues a task.
    ///
    /// If the queue is idle the task starts immediately; otherwise it waits
    /// its turn. After [`cancel`](TaskQueue::cancel) the task is dropped
    /// without running, releasing its captured resources.
    pub fn add(&self, task: SequencedTask) {
        // A send error means the worker is gone; dropping the task here is
        // exactly the required cleanup.
        let _ = self.tx.send(task);
    }

    /// Stops the worker and releases all pending tasks. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once [`cancel`](TaskQueue::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn worker(mut rx: mpsc::UnboundedReceiver<SequencedTask>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = rx.recv() => {
                let Some(task) = next else { break };
                if task.is_expired(Instant::now()) {
                    task.expire();
                    continue;
                }
                let body = task.run();
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = body => {}
                }
            }
        }
    }
    // Dropping `rx` drops every task still in the channel, releasing all
    // resources captured by their closures.
}
