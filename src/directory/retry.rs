//! # Remove operation with timeout-scoped retry.
//!
//! Deregistration must not be lost to a transient timeout: a provider that
//! stays registered in the global directory after shutdown keeps winning
//! arbitrations it can no longer serve. The remove operation therefore retries
//! **only** timeout-class runtime errors, without bound, assuming the remove
//! RPC is idempotent. Every other outcome is terminal:
//!
//! ```text
//! execute() loop {
//!   upgrade weak proxy ── gone ──► RuntimeError::ProxyUnavailable, stop
//!   remove RPC
//!     ├─ Ok                  ──► forward success, stop
//!     ├─ application error   ──► forward rejection, stop (no retry)
//!     ├─ runtime: timeout    ──► publish RemoveRetried, loop again
//!     └─ runtime: other      ──► forward failure, stop
//! }
//! ```
//!
//! The proxy is held as a [`Weak`] reference: a retry loop queued behind other
//! work must not keep a torn-down proxy alive, and a proxy swap via
//! `set_proxy` must be observable. The reference is re-upgraded on every
//! attempt.
//!
//! Cancellation: if the owning queue is canceled before (or while) the
//! operation runs, the operation is dropped and the completion sender closes;
//! the caller observes [`RuntimeError::Canceled`] through its
//! [`Completion`](crate::Completion) handle.

use std::sync::Weak;

use tokio::sync::oneshot;

use crate::error::{CallError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::qos::MessagingQos;

use super::proxy::DirectoryProxy;

/// One remove RPC with unbounded retry on timeouts.
pub(crate) struct RetryRemoveOperation {
    proxy: Option<Weak<dyn DirectoryProxy>>,
    participant_id: String,
    gbids: Vec<String>,
    qos: MessagingQos,
    bus: Bus,
    done: oneshot::Sender<Result<(), CallError>>,
}

impl RetryRemoveOperation {
    pub(crate) fn new(
        proxy: Option<Weak<dyn DirectoryProxy>>,
        participant_id: String,
        gbids: Vec<String>,
        qos: MessagingQos,
        bus: Bus,
        done: oneshot::Sender<Result<(), CallError>>,
    ) -> Self {
        Self {
            proxy,
            participant_id,
            gbids,
            qos,
            bus,
            done,
        }
    }

    /// Drives the retry loop to a terminal outcome and resolves the
    /// completion channel exactly once.
    pub(crate) async fn execute(self) {
        let Self {
            proxy,
            participant_id,
            gbids,
            qos,
            bus,
            done,
        } = self;

        let mut attempt: u32 = 0;
        let outcome = loop {
            attempt += 1;
            let Some(proxy) = proxy.as_ref().and_then(Weak::upgrade) else {
                bus.publish(
                    Event::new(EventKind::RemoveAborted).with_participant(participant_id.as_str()),
                );
                break Err(CallError::Runtime(RuntimeError::ProxyUnavailable));
            };

            match proxy
                .remove(participant_id.clone(), gbids.clone(), qos.clone())
                .await
            {
                Ok(()) => {
                    bus.publish(
                        Event::new(EventKind::RemoveSucceeded)
                            .with_participant(participant_id.as_str())
                            .with_attempt(attempt),
                    );
                    break Ok(());
                }
                Err(CallError::Rejected(e)) => {
                    bus.publish(
                        Event::new(EventKind::RemoveRejected)
                            .with_participant(participant_id.as_str())
                            .with_reason(e.to_string()),
                    );
                    break Err(CallError::Rejected(e));
                }
                Err(CallError::Runtime(e)) if e.is_retryable() => {
                    bus.publish(
                        Event::new(EventKind::RemoveRetried)
                            .with_participant(participant_id.as_str())
                            .with_attempt(attempt),
                    );
                    continue;
                }
                Err(CallError::Runtime(e)) => {
                    bus.publish(
                        Event::new(EventKind::RemoveFailed)
                            .with_participant(participant_id.as_str())
                            .with_reason(e.to_string()),
                    );
                    break Err(CallError::Runtime(e));
                }
            }
        };

        let _ = done.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::types::{DiscoveryEntry, GlobalDiscoveryEntry, ProviderQos, Version};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Proxy double whose `remove` pops scripted outcomes; the call counter is
    /// shared so it survives the proxy being dropped.
    struct ScriptedProxy {
        remove_outcomes: Mutex<VecDeque<Result<(), CallError>>>,
        remove_calls: Arc<AtomicU32>,
    }

    impl ScriptedProxy {
        fn new(outcomes: Vec<Result<(), CallError>>) -> (Arc<Self>, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            let proxy = Arc::new(Self {
                remove_outcomes: Mutex::new(outcomes.into()),
                remove_calls: calls.clone(),
            });
            (proxy, calls)
        }
    }

    #[async_trait]
    impl DirectoryProxy for ScriptedProxy {
        async fn add(
            &self,
            _entry: GlobalDiscoveryEntry,
            _gbids: Vec<String>,
            _qos: MessagingQos,
        ) -> Result<(), CallError> {
            Ok(())
        }

        async fn remove(
            &self,
            _participant_id: String,
            _gbids: Vec<String>,
            _qos: MessagingQos,
        ) -> Result<(), CallError> {
            self.remove_calls.fetch_add(1, Ordering::SeqCst);
            self.remove_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn lookup_domains(
            &self,
            _domains: Vec<String>,
            _interface_name: String,
            _gbids: Vec<String>,
            _qos: MessagingQos,
        ) -> Result<Vec<GlobalDiscoveryEntry>, CallError> {
            Ok(Vec::new())
        }

        async fn lookup_participant(
            &self,
            participant_id: String,
            _gbids: Vec<String>,
            _qos: MessagingQos,
        ) -> Result<GlobalDiscoveryEntry, CallError> {
            Ok(GlobalDiscoveryEntry::from_local(
                DiscoveryEntry::new(
                    participant_id,
                    "d",
                    "i",
                    Version::new(1, 0),
                    ProviderQos::default(),
                ),
                "addr",
            ))
        }

        async fn touch(
            &self,
            _cluster_controller_id: String,
            _participant_ids: Vec<String>,
            _qos: MessagingQos,
        ) -> Result<(), RuntimeError> {
            Ok(())
        }

        async fn remove_stale(
            &self,
            _cluster_controller_id: String,
            _max_last_seen_ms: i64,
            _qos: MessagingQos,
        ) -> Result<(), RuntimeError> {
            Ok(())
        }
    }

    fn timeout() -> CallError {
        CallError::Runtime(RuntimeError::Timeout {
            timeout: Duration::from_millis(100),
        })
    }

    fn op_for(
        proxy: Option<Weak<dyn DirectoryProxy>>,
    ) -> (RetryRemoveOperation, oneshot::Receiver<Result<(), CallError>>) {
        let (tx, rx) = oneshot::channel();
        let op = RetryRemoveOperation::new(
            proxy,
            "p-1".into(),
            vec!["backend-a".into()],
            MessagingQos::default().with_gbid("backend-a"),
            Bus::new(16),
            tx,
        );
        (op, rx)
    }

    fn downgrade(proxy: &Arc<ScriptedProxy>) -> Weak<dyn DirectoryProxy> {
        let obj: Arc<dyn DirectoryProxy> = Arc::clone(proxy) as Arc<dyn DirectoryProxy>;
        Arc::downgrade(&obj)
    }

    #[tokio::test]
    async fn test_retries_timeouts_until_success() {
        let (proxy, calls) = ScriptedProxy::new(vec![Err(timeout()), Err(timeout()), Ok(())]);
        let (op, rx) = op_for(Some(downgrade(&proxy)));

        op.execute().await;
        assert_eq!(rx.await.unwrap(), Ok(()));
        assert_eq!(
            calls.load(Ordering::SeqCst),
            3,
            "two timeouts then success = three calls"
        );
    }

    #[tokio::test]
    async fn test_application_error_is_not_retried() {
        let (proxy, calls) = ScriptedProxy::new(vec![Err(CallError::Rejected(
            DiscoveryError::NoEntryForParticipant,
        ))]);
        let (op, rx) = op_for(Some(downgrade(&proxy)));

        op.execute().await;
        assert_eq!(
            rx.await.unwrap(),
            Err(CallError::Rejected(DiscoveryError::NoEntryForParticipant))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_timeout_runtime_error_is_not_retried() {
        let (proxy, calls) = ScriptedProxy::new(vec![Err(CallError::Runtime(
            RuntimeError::Transport {
                message: "connection reset".into(),
            },
        ))]);
        let (op, rx) = op_for(Some(downgrade(&proxy)));

        op.execute().await;
        let err = rx.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            CallError::Runtime(RuntimeError::Transport { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dead_proxy_reports_proxy_unavailable_without_retry() {
        let (proxy, calls) = ScriptedProxy::new(vec![]);
        let weak = downgrade(&proxy);
        drop(proxy); // every strong reference gone before execution

        let (op, rx) = op_for(Some(weak));
        op.execute().await;

        assert_eq!(
            rx.await.unwrap(),
            Err(CallError::Runtime(RuntimeError::ProxyUnavailable))
        );
        assert_eq!(
            calls.load(Ordering::SeqCst),
            0,
            "no RPC may be issued without a proxy"
        );
    }

    #[tokio::test]
    async fn test_missing_proxy_slot_reports_proxy_unavailable() {
        let (op, rx) = op_for(None);
        op.execute().await;
        assert_eq!(
            rx.await.unwrap(),
            Err(CallError::Runtime(RuntimeError::ProxyUnavailable))
        );
    }
}
