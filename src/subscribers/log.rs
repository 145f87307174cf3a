//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [add-ok] participant=p-1 gbid=backend-a
//! [add-expired] participant=p-1
//! [remove-retry] participant=p-1 attempt=3
//! [arbitration-failed] interface=vehicle/Radio reason="no provider entries found..."
//! ```
//!
//! Not intended for production use - implement a custom
//! [`Subscribe`](crate::Subscribe) for structured logging or metrics.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self
    }
}

fn opt(field: &Option<std::sync::Arc<str>>) -> &str {
    field.as_deref().unwrap_or("-")
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::AddSucceeded => {
                println!("[add-ok] participant={} gbid={}", opt(&e.participant), opt(&e.gbid));
            }
            EventKind::AddExpired => {
                println!("[add-expired] participant={}", opt(&e.participant));
            }
            EventKind::AddRejected => {
                println!(
                    "[add-rejected] participant={} reason={:?}",
                    opt(&e.participant),
                    opt(&e.reason)
                );
            }
            EventKind::AddFailed => {
                println!(
                    "[add-failed] participant={} reason={:?}",
                    opt(&e.participant),
                    opt(&e.reason)
                );
            }
            EventKind::ReAddSkipped => {
                println!("[re-add-skipped] participant={}", opt(&e.participant));
            }
            EventKind::ReAddSucceeded => {
                println!("[re-add-ok] participant={}", opt(&e.participant));
            }
            EventKind::ReAddFailed => {
                println!(
                    "[re-add-failed] participant={} reason={:?}",
                    opt(&e.participant),
                    opt(&e.reason)
                );
            }
            EventKind::ReAddCompleted => {
                println!("[re-add-completed]");
            }
            EventKind::RemoveRetried => {
                println!(
                    "[remove-retry] participant={} attempt={}",
                    opt(&e.participant),
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::RemoveAborted => {
                println!("[remove-aborted] participant={}", opt(&e.participant));
            }
            EventKind::RemoveSucceeded => {
                println!("[remove-ok] participant={}", opt(&e.participant));
            }
            EventKind::RemoveRejected => {
                println!(
                    "[remove-rejected] participant={} reason={:?}",
                    opt(&e.participant),
                    opt(&e.reason)
                );
            }
            EventKind::RemoveFailed => {
                println!(
                    "[remove-failed] participant={} reason={:?}",
                    opt(&e.participant),
                    opt(&e.reason)
                );
            }
            EventKind::TouchFailed => {
                println!("[touch-failed] gbid={} reason={:?}", opt(&e.gbid), opt(&e.reason));
            }
            EventKind::RemoveStaleFailed => {
                println!(
                    "[remove-stale-failed] gbid={} reason={:?}",
                    opt(&e.gbid),
                    opt(&e.reason)
                );
            }
            EventKind::ArbitrationStarted => {
                println!(
                    "[arbitration-started] interface={} domains={:?}",
                    opt(&e.interface),
                    opt(&e.reason)
                );
            }
            EventKind::ProviderSelected => {
                println!(
                    "[provider-selected] interface={} participant={}",
                    opt(&e.interface),
                    opt(&e.participant)
                );
            }
            EventKind::ArbitrationFailed => {
                println!(
                    "[arbitration-failed] interface={} reason={:?}",
                    opt(&e.interface),
                    opt(&e.reason)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
