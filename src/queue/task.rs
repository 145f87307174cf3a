//! # A deferred unit of work with an optional deadline.
//!
//! [`SequencedTask`] bundles three things:
//! - a **body**: a closure producing the future to drive when the task's turn
//!   arrives;
//! - an optional **deadline**: an absolute instant after which the body must
//!   not start;
//! - an **expiry callback**: invoked instead of the body when the deadline has
//!   passed by the time the task is dequeued.
//!
//! The body is deferred on purpose: nothing it captures is touched until the
//! queue decides to run it, so canceling the queue releases every captured
//! resource by simply dropping the task.

use futures::future::BoxFuture;
use tokio::time::Instant;

type TaskBody = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>;
type ExpiryCallback = Box<dyn FnOnce() + Send + 'static>;

/// A deferred, optionally deadlined unit of work for the [`TaskQueue`](crate::TaskQueue).
///
/// # Example
/// ```
/// use tokio::time::{Duration, Instant};
/// use provisor::SequencedTask;
///
/// let task = SequencedTask::new(|| async {
///     // issue an RPC, forward its outcome...
/// })
/// .with_deadline(Instant::now() + Duration::from_secs(60), || {
///     // report "too late" to whoever is waiting
/// });
/// # let _ = task;
/// ```
pub struct SequencedTask {
    body: TaskBody,
    expires_at: Option<Instant>,
    on_expired: Option<ExpiryCallback>,
}

impl SequencedTask {
    /// Creates a task with no deadline (it runs whenever its turn arrives).
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            body: Box::new(move || {
                let fut: BoxFuture<'static, ()> = Box::pin(body());
                fut
            }),
            expires_at: None,
            on_expired: None,
        }
    }

    /// Attaches an absolute deadline and the callback to fire if the deadline
    /// passes before the task starts.
    pub fn with_deadline(
        mut self,
        expires_at: Instant,
        on_expired: impl FnOnce() + Send + 'static,
    ) -> Self {
        self.expires_at = Some(expires_at);
        self.on_expired = Some(Box::new(on_expired));
        self
    }

    /// True if the task's deadline has passed at `now`.
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if now >= at)
    }

    /// Consumes the task, firing its expiry callback (if any).
    pub(crate) fn expire(self) {
        if let Some(cb) = self.on_expired {
            cb();
        }
    }

    /// Consumes the task, producing the body future.
    pub(crate) fn run(self) -> BoxFuture<'static, ()> {
        (self.body)()
    }
}
