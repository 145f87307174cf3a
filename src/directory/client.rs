//! # DirectoryClient: the capabilities-directory integration point.
//!
//! One instance mediates all traffic between local provider state and the
//! remote global capabilities directory.
//!
//! ## Architecture
//! ```text
//! add / re_add / remove ──► [TaskQueue] ──► worker drives one RPC at a time
//!        (queued, ordered,                     │
//!         never overlapping)                   ▼
//!                                      DirectoryProxy (rebindable slot)
//!                                              ▲
//! lookup / touch / remove_stale ───────────────┘
//!        (direct async calls, no ordering guarantee)
//! ```
//!
//! ## Rules
//! - Queued operations execute strictly in submission order; the queue only
//!   advances when an operation's RPC (including the remove retry loop) has
//!   reached a terminal outcome.
//! - `add` carries a deadline equal to its messaging TTL: if the operation
//!   cannot start in time it resolves with [`RuntimeError::Expired`] and the
//!   network is never touched; otherwise the outbound TTL is reduced to the
//!   time remaining.
//! - Every RPC routes to `gbids[0]` via the GBID custom header, even when
//!   more GBIDs are supplied. The full list still travels in the request
//!   body; only header routing uses the first element.
//! - Callbacks and completions may resolve on a different task/thread than
//!   the submitter.
//! - [`shutdown`](DirectoryClient::shutdown) cancels the queue, releasing
//!   every pending operation; their [`Completion`] handles resolve with
//!   [`RuntimeError::Canceled`]. Called automatically on drop; idempotent.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::config::DirectoryConfig;
use crate::error::{CallError, DiscoveryError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::qos::MessagingQos;
use crate::queue::{SequencedTask, TaskQueue};
use crate::types::GlobalDiscoveryEntry;

use super::proxy::DirectoryProxy;
use super::retry::RetryRemoveOperation;
use super::store::CapabilitiesStore;

/// Completion handle of a queued directory operation.
///
/// Resolves once the operation reaches a terminal outcome. If the client is
/// shut down before (or while) the operation runs, the handle resolves with
/// [`RuntimeError::Canceled`]. Dropping the handle is fine; the operation
/// still runs (fire-and-forget).
pub struct Completion {
    rx: oneshot::Receiver<Result<(), CallError>>,
}

impl Completion {
    fn new(rx: oneshot::Receiver<Result<(), CallError>>) -> Self {
        Self { rx }
    }
}

impl Future for Completion {
    type Output = Result<(), CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                Poll::Ready(Err(CallError::Runtime(RuntimeError::Canceled)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Rebindable, shared slot holding the current directory proxy.
#[derive(Default)]
struct ProxySlot {
    inner: RwLock<Option<Arc<dyn DirectoryProxy>>>,
}

impl ProxySlot {
    fn get(&self) -> Option<Arc<dyn DirectoryProxy>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, proxy: Arc<dyn DirectoryProxy>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(proxy);
    }

    fn downgrade(&self) -> Option<Weak<dyn DirectoryProxy>> {
        self.get().map(|p| Arc::downgrade(&p))
    }
}

/// Shared slot for a completion sender that exactly one of several
/// continuations (body or expiry callback) will consume.
type DoneSlot = Arc<Mutex<Option<oneshot::Sender<Result<(), CallError>>>>>;

fn resolve(done: &DoneSlot, outcome: Result<(), CallError>) {
    if let Some(tx) = done
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
    {
        let _ = tx.send(outcome);
    }
}

/// Client for the global capabilities directory.
///
/// Construction requires a running tokio runtime (the queue worker is
/// spawned immediately). The proxy is bound later via
/// [`set_proxy`](DirectoryClient::set_proxy) and may be rebound at any time,
/// concurrently with in-flight operations.
pub struct DirectoryClient {
    cfg: DirectoryConfig,
    slot: Arc<ProxySlot>,
    queue: TaskQueue,
    bus: Bus,
}

impl DirectoryClient {
    /// Creates a client with no proxy bound yet.
    #[must_use]
    pub fn new(cfg: DirectoryConfig, bus: Bus) -> Self {
        Self {
            cfg,
            slot: Arc::new(ProxySlot::default()),
            queue: TaskQueue::new(),
            bus,
        }
    }

    /// Binds or rebinds the directory proxy.
    ///
    /// Safe to call concurrently with in-flight operations: queued operations
    /// resolve the slot when they execute, and the remove retry holds only a
    /// weak reference.
    pub fn set_proxy(&self, proxy: Arc<dyn DirectoryProxy>) {
        self.slot.set(proxy);
    }

    /// Registers a provider entry with the global directory.
    ///
    /// Queued; ordered with respect to other `add`/`re_add`/`remove` calls.
    /// The operation's deadline is now + `message_ttl`; if its turn arrives
    /// too late, the handle resolves with [`RuntimeError::Expired`] and no
    /// RPC is issued. Otherwise the RPC's TTL is the time remaining until the
    /// deadline.
    pub fn add(&self, entry: GlobalDiscoveryEntry, gbids: Vec<String>) -> Completion {
        let (tx, rx) = oneshot::channel();
        let Some(first_gbid) = gbids.first().cloned() else {
            let _ = tx.send(Err(CallError::Rejected(DiscoveryError::InvalidGbid)));
            return Completion::new(rx);
        };

        let qos = MessagingQos::new(self.cfg.message_ttl).with_gbid(first_gbid.clone());
        let expires_at = Instant::now() + self.cfg.message_ttl;
        let done: DoneSlot = Arc::new(Mutex::new(Some(tx)));
        let participant: Arc<str> = Arc::from(entry.participant_id());
        let slot = Arc::clone(&self.slot);

        let body_bus = self.bus.clone();
        let body_done = Arc::clone(&done);
        let body_participant = Arc::clone(&participant);
        let expiry_bus = self.bus.clone();

        let task = SequencedTask::new(move || async move {
            let now = Instant::now();
            if now >= expires_at {
                body_bus.publish(
                    Event::new(EventKind::AddExpired).with_participant(body_participant),
                );
                resolve(&body_done, Err(CallError::Runtime(RuntimeError::Expired)));
                return;
            }
            let qos = qos.with_ttl(expires_at - now);

            let Some(proxy) = slot.get() else {
                body_bus.publish(
                    Event::new(EventKind::AddFailed)
                        .with_participant(body_participant)
                        .with_reason(RuntimeError::ProxyUnavailable.to_string()),
                );
                resolve(
                    &body_done,
                    Err(CallError::Runtime(RuntimeError::ProxyUnavailable)),
                );
                return;
            };

            let outcome = proxy.add(entry, gbids, qos).await;
            match &outcome {
                Ok(()) => body_bus.publish(
                    Event::new(EventKind::AddSucceeded)
                        .with_participant(body_participant)
                        .with_gbid(first_gbid.as_str()),
                ),
                Err(CallError::Rejected(e)) => body_bus.publish(
                    Event::new(EventKind::AddRejected)
                        .with_participant(body_participant)
                        .with_reason(e.to_string()),
                ),
                Err(CallError::Runtime(e)) => body_bus.publish(
                    Event::new(EventKind::AddFailed)
                        .with_participant(body_participant)
                        .with_reason(e.to_string()),
                ),
            }
            resolve(&body_done, outcome);
        })
        .with_deadline(expires_at, move || {
            expiry_bus.publish(Event::new(EventKind::AddExpired).with_participant(participant));
            resolve(&done, Err(CallError::Runtime(RuntimeError::Expired)));
        });

        self.queue.add(task);
        Completion::new(rx)
    }

    /// Re-announces every globally registered provider from the local store.
    ///
    /// Queued with no deadline. Best-effort: entries without known
    /// GBIDs are skipped, per-entry failures are published as events and
    /// counted as done, and the handle always resolves `Ok` once every entry
    /// is accounted for. The per-entry adds run concurrently (fire-and-forget
    /// semantics); only the batch as a whole occupies the queue.
    pub fn re_add(
        &self,
        store: Arc<dyn CapabilitiesStore>,
        local_address: impl Into<String>,
    ) -> Completion {
        let (tx, rx) = oneshot::channel();
        let local_address = local_address.into();
        let message_ttl = self.cfg.message_ttl;
        let bus = self.bus.clone();
        let slot = Arc::clone(&self.slot);

        let task = SequencedTask::new(move || async move {
            let entries = store.all_global_capabilities();
            if entries.is_empty() {
                bus.publish(
                    Event::new(EventKind::ReAddCompleted)
                        .with_reason("no globally registered providers"),
                );
                let _ = tx.send(Ok(()));
                return;
            }

            let mut announcements = Vec::new();
            for entry in entries {
                let gbids = store.gbids_for_participant(&entry.participant_id);
                if gbids.is_empty() {
                    bus.publish(
                        Event::new(EventKind::ReAddSkipped)
                            .with_participant(entry.participant_id.as_str()),
                    );
                    continue;
                }

                let participant: Arc<str> = Arc::from(entry.participant_id.as_str());
                let global = GlobalDiscoveryEntry::from_local(entry, local_address.clone());
                let qos = MessagingQos::new(message_ttl).with_gbid(gbids[0].clone());
                let proxy = slot.get();
                let bus = bus.clone();

                announcements.push(async move {
                    let Some(proxy) = proxy else {
                        bus.publish(
                            Event::new(EventKind::ReAddFailed)
                                .with_participant(participant)
                                .with_reason(RuntimeError::ProxyUnavailable.to_string()),
                        );
                        return;
                    };
                    match proxy.add(global, gbids, qos).await {
                        Ok(()) => bus.publish(
                            Event::new(EventKind::ReAddSucceeded).with_participant(participant),
                        ),
                        Err(e) => bus.publish(
                            Event::new(EventKind::ReAddFailed)
                                .with_participant(participant)
                                .with_reason(e.to_string()),
                        ),
                    }
                });
            }

            join_all(announcements).await;
            bus.publish(Event::new(EventKind::ReAddCompleted));
            let _ = tx.send(Ok(()));
        });

        self.queue.add(task);
        Completion::new(rx)
    }

    /// Deregisters a provider, retrying timed-out attempts indefinitely.
    ///
    /// Queued with no deadline. Timed-out attempts are retried without bound
    /// (the remove RPC is idempotent); application errors and other runtime
    /// errors are terminal. The queue does not advance past this operation
    /// until the retry loop reaches a terminal outcome.
    pub fn remove(&self, participant_id: impl Into<String>, gbids: Vec<String>) -> Completion {
        let (tx, rx) = oneshot::channel();
        let Some(first_gbid) = gbids.first().cloned() else {
            let _ = tx.send(Err(CallError::Rejected(DiscoveryError::InvalidGbid)));
            return Completion::new(rx);
        };

        let qos = MessagingQos::new(self.cfg.message_ttl).with_gbid(first_gbid);
        let op = RetryRemoveOperation::new(
            self.slot.downgrade(),
            participant_id.into(),
            gbids,
            qos,
            self.bus.clone(),
            tx,
        );

        self.queue.add(SequencedTask::new(move || op.execute()));
        Completion::new(rx)
    }

    /// Looks up all providers of `interface_name` in `domains`.
    ///
    /// Direct call: not queued, no ordering guarantee relative to anything.
    pub async fn lookup(
        &self,
        domains: Vec<String>,
        interface_name: impl Into<String>,
        gbids: Vec<String>,
        ttl: Duration,
    ) -> Result<Vec<GlobalDiscoveryEntry>, CallError> {
        let first_gbid = gbids
            .first()
            .cloned()
            .ok_or(CallError::Rejected(DiscoveryError::InvalidGbid))?;
        let proxy = self
            .slot
            .get()
            .ok_or(CallError::Runtime(RuntimeError::ProxyUnavailable))?;
        let qos = MessagingQos::new(ttl).with_gbid(first_gbid);
        proxy
            .lookup_domains(domains, interface_name.into(), gbids, qos)
            .await
    }

    /// Looks up a single provider by participant id.
    ///
    /// Direct call. The single result is wrapped into a one-element list for
    /// interface uniformity with the domain-based lookup.
    pub async fn lookup_participant(
        &self,
        participant_id: impl Into<String>,
        gbids: Vec<String>,
        ttl: Duration,
    ) -> Result<Vec<GlobalDiscoveryEntry>, CallError> {
        let first_gbid = gbids
            .first()
            .cloned()
            .ok_or(CallError::Rejected(DiscoveryError::InvalidGbid))?;
        let proxy = self
            .slot
            .get()
            .ok_or(CallError::Runtime(RuntimeError::ProxyUnavailable))?;
        let qos = MessagingQos::new(ttl).with_gbid(first_gbid);
        proxy
            .lookup_participant(participant_id.into(), gbids, qos)
            .await
            .map(|entry| vec![entry])
    }

    /// Marks a batch of participants as alive under one GBID.
    ///
    /// Direct call. Uses the fixed freshness TTL
    /// ([`DirectoryConfig::touch_ttl`]), not the general message TTL.
    pub async fn touch(
        &self,
        cluster_controller_id: impl Into<String>,
        participant_ids: Vec<String>,
        gbid: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let gbid = gbid.into();
        let proxy = self.slot.get().ok_or(RuntimeError::ProxyUnavailable)?;
        let qos = MessagingQos::new(self.cfg.touch_ttl).with_gbid(gbid.clone());
        let res = proxy
            .touch(cluster_controller_id.into(), participant_ids, qos)
            .await;
        if let Err(e) = &res {
            self.bus.publish(
                Event::new(EventKind::TouchFailed)
                    .with_gbid(gbid)
                    .with_reason(e.to_string()),
            );
        }
        res
    }

    /// Instructs the directory to purge entries under `gbid` not seen since
    /// `max_last_seen_ms`.
    ///
    /// Direct call. Uses the long fixed TTL
    /// ([`DirectoryConfig::remove_stale_ttl`]): the purge instruction stays
    /// deliverable through short backend outages.
    pub async fn remove_stale(
        &self,
        cluster_controller_id: impl Into<String>,
        max_last_seen_ms: i64,
        gbid: impl Into<String>,
    ) -> Result<(), RuntimeError> {
        let gbid = gbid.into();
        let proxy = self.slot.get().ok_or(RuntimeError::ProxyUnavailable)?;
        let qos = MessagingQos::new(self.cfg.remove_stale_ttl).with_gbid(gbid.clone());
        let res = proxy
            .remove_stale(cluster_controller_id.into(), max_last_seen_ms, qos)
            .await;
        if let Err(e) = &res {
            self.bus.publish(
                Event::new(EventKind::RemoveStaleFailed)
                    .with_gbid(gbid)
                    .with_reason(e.to_string()),
            );
        }
        res
    }

    /// Cancels the task queue, releasing all pending operations.
    ///
    /// Idempotent; also invoked on drop. In-flight RPCs stop being awaited;
    /// pending completions resolve with [`RuntimeError::Canceled`].
    pub fn shutdown(&self) {
        self.queue.cancel();
    }
}

impl Drop for DirectoryClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscoveryEntry, ProviderQos, Version};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::sleep;

    /// Proxy double recording every call with its QoS; optional per-op delay
    /// and scripted add failure.
    struct RecordingProxy {
        calls: Mutex<Vec<(&'static str, MessagingQos)>>,
        add_delay: Duration,
        fail_adds: AtomicBool,
    }

    impl RecordingProxy {
        fn new() -> Arc<Self> {
            Self::with_add_delay(Duration::ZERO)
        }

        fn with_add_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                add_delay: delay,
                fail_adds: AtomicBool::new(false),
            })
        }

        fn calls(&self) -> Vec<(&'static str, MessagingQos)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, op: &'static str, qos: &MessagingQos) {
            self.calls.lock().unwrap().push((op, qos.clone()));
        }
    }

    #[async_trait]
    impl DirectoryProxy for RecordingProxy {
        async fn add(
            &self,
            _entry: GlobalDiscoveryEntry,
            _gbids: Vec<String>,
            qos: MessagingQos,
        ) -> Result<(), CallError> {
            self.record("add", &qos);
            if !self.add_delay.is_zero() {
                sleep(self.add_delay).await;
            }
            if self.fail_adds.load(Ordering::SeqCst) {
                return Err(CallError::Runtime(RuntimeError::Transport {
                    message: "broker unreachable".into(),
                }));
            }
            Ok(())
        }

        async fn remove(
            &self,
            _participant_id: String,
            _gbids: Vec<String>,
            qos: MessagingQos,
        ) -> Result<(), CallError> {
            self.record("remove", &qos);
            Ok(())
        }

        async fn lookup_domains(
            &self,
            _domains: Vec<String>,
            _interface_name: String,
            _gbids: Vec<String>,
            qos: MessagingQos,
        ) -> Result<Vec<GlobalDiscoveryEntry>, CallError> {
            self.record("lookup_domains", &qos);
            Ok(Vec::new())
        }

        async fn lookup_participant(
            &self,
            participant_id: String,
            _gbids: Vec<String>,
            qos: MessagingQos,
        ) -> Result<GlobalDiscoveryEntry, CallError> {
            self.record("lookup_participant", &qos);
            Ok(global_entry(&participant_id))
        }

        async fn touch(
            &self,
            _cluster_controller_id: String,
            _participant_ids: Vec<String>,
            qos: MessagingQos,
        ) -> Result<(), RuntimeError> {
            self.record("touch", &qos);
            Ok(())
        }

        async fn remove_stale(
            &self,
            _cluster_controller_id: String,
            _max_last_seen_ms: i64,
            qos: MessagingQos,
        ) -> Result<(), RuntimeError> {
            self.record("remove_stale", &qos);
            Ok(())
        }
    }

    fn global_entry(participant_id: &str) -> GlobalDiscoveryEntry {
        GlobalDiscoveryEntry::from_local(
            DiscoveryEntry::new(
                participant_id,
                "domain",
                "test/Interface",
                Version::new(1, 0),
                ProviderQos::default(),
            ),
            "mqtt://broker/topic",
        )
    }

    fn client_with(proxy: &Arc<RecordingProxy>, cfg: DirectoryConfig) -> DirectoryClient {
        let client = DirectoryClient::new(cfg, Bus::new(64));
        client.set_proxy(Arc::clone(proxy) as Arc<dyn DirectoryProxy>);
        client
    }

    struct FixedStore {
        entries: Vec<DiscoveryEntry>,
        gbids: std::collections::HashMap<String, Vec<String>>,
    }

    impl CapabilitiesStore for FixedStore {
        fn all_global_capabilities(&self) -> Vec<DiscoveryEntry> {
            self.entries.clone()
        }

        fn gbids_for_participant(&self, participant_id: &str) -> Vec<String> {
            self.gbids.get(participant_id).cloned().unwrap_or_default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_with_elapsed_ttl_skips_the_network_call() {
        let proxy = RecordingProxy::new();
        let cfg = DirectoryConfig {
            message_ttl: Duration::ZERO,
            ..DirectoryConfig::default()
        };
        let client = client_with(&proxy, cfg);

        let outcome = client
            .add(global_entry("p-1"), vec!["backend-a".into()])
            .await;

        assert_eq!(outcome, Err(CallError::Runtime(RuntimeError::Expired)));
        assert!(proxy.calls().is_empty(), "no RPC may be issued");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_expires_while_waiting_behind_a_slow_operation() {
        let proxy = RecordingProxy::with_add_delay(Duration::from_millis(200));
        let cfg = DirectoryConfig {
            message_ttl: Duration::from_millis(100),
            ..DirectoryConfig::default()
        };
        let client = client_with(&proxy, cfg);

        let first = client.add(global_entry("p-1"), vec!["backend-a".into()]);
        let second = client.add(global_entry("p-2"), vec!["backend-a".into()]);

        // The first operation's RPC outlives the second's deadline; the first
        // itself started in time and still completes.
        assert_eq!(first.await, Ok(()));
        assert_eq!(second.await, Err(CallError::Runtime(RuntimeError::Expired)));
        assert_eq!(proxy.calls().len(), 1, "second add must not reach the proxy");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_reduces_outbound_ttl_to_remaining_time() {
        let proxy = RecordingProxy::with_add_delay(Duration::from_millis(40));
        let cfg = DirectoryConfig {
            message_ttl: Duration::from_millis(100),
            ..DirectoryConfig::default()
        };
        let client = client_with(&proxy, cfg);

        let first = client.add(global_entry("p-1"), vec!["backend-a".into()]);
        let second = client.add(global_entry("p-2"), vec!["backend-a".into()]);
        first.await.unwrap();
        second.await.unwrap();

        let calls = proxy.calls();
        assert_eq!(calls.len(), 2);
        let first_ttl = calls[0].1.ttl();
        let second_ttl = calls[1].1.ttl();
        assert_eq!(first_ttl, Duration::from_millis(100));
        assert!(
            second_ttl <= Duration::from_millis(60) && second_ttl > Duration::ZERO,
            "second TTL should be the remaining time, got {second_ttl:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_routes_to_the_first_gbid_only() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());

        client
            .add(
                global_entry("p-1"),
                vec!["backend-a".into(), "backend-b".into()],
            )
            .await
            .unwrap();

        let calls = proxy.calls();
        assert_eq!(calls[0].1.gbid(), Some("backend-a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_with_empty_gbid_list_is_rejected_up_front() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());

        let outcome = client.add(global_entry("p-1"), Vec::new()).await;

        assert_eq!(
            outcome,
            Err(CallError::Rejected(DiscoveryError::InvalidGbid))
        );
        assert!(proxy.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_without_proxy_fails_with_proxy_unavailable() {
        let client = DirectoryClient::new(DirectoryConfig::default(), Bus::new(64));

        let outcome = client
            .add(global_entry("p-1"), vec!["backend-a".into()])
            .await;

        assert_eq!(
            outcome,
            Err(CallError::Runtime(RuntimeError::ProxyUnavailable))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutating_operations_preserve_submission_order() {
        let proxy = RecordingProxy::with_add_delay(Duration::from_millis(10));
        let client = client_with(&proxy, DirectoryConfig::default());

        let a = client.add(global_entry("p-1"), vec!["g".into()]);
        let b = client.remove("p-1", vec!["g".into()]);
        let c = client.add(global_entry("p-2"), vec!["g".into()]);

        a.await.unwrap();
        b.await.unwrap();
        c.await.unwrap();

        let ops: Vec<&str> = proxy.calls().iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec!["add", "remove", "add"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_resolves_pending_completions_as_canceled() {
        let proxy = RecordingProxy::with_add_delay(Duration::from_secs(3600));
        let client = client_with(&proxy, DirectoryConfig::default());

        let in_flight = client.add(global_entry("p-1"), vec!["g".into()]);
        let pending = client.remove("p-2", vec!["g".into()]);

        // Let the worker pick up the first operation before canceling.
        tokio::task::yield_now().await;
        client.shutdown();

        assert_eq!(
            in_flight.await,
            Err(CallError::Runtime(RuntimeError::Canceled))
        );
        assert_eq!(
            pending.await,
            Err(CallError::Runtime(RuntimeError::Canceled))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_re_add_with_empty_store_completes_immediately() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());
        let store = Arc::new(FixedStore {
            entries: Vec::new(),
            gbids: Default::default(),
        });

        assert_eq!(client.re_add(store, "local-address").await, Ok(()));
        assert!(proxy.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_re_add_announces_entries_and_skips_unknown_gbids() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());

        let entry = |id: &str| {
            DiscoveryEntry::new(
                id,
                "domain",
                "test/Interface",
                Version::new(1, 0),
                ProviderQos::default(),
            )
        };
        let mut gbids = std::collections::HashMap::new();
        gbids.insert("p-1".to_string(), vec!["backend-a".to_string()]);
        gbids.insert(
            "p-3".to_string(),
            vec!["backend-b".to_string(), "backend-c".to_string()],
        );
        let store = Arc::new(FixedStore {
            entries: vec![entry("p-1"), entry("p-2"), entry("p-3")],
            gbids,
        });

        assert_eq!(client.re_add(store, "local-address").await, Ok(()));

        let calls = proxy.calls();
        assert_eq!(calls.len(), 2, "p-2 has no GBIDs and must be skipped");
        let headers: Vec<_> = calls
            .iter()
            .map(|(_, qos)| qos.gbid().unwrap().to_string())
            .collect();
        assert!(headers.contains(&"backend-a".to_string()));
        assert!(headers.contains(&"backend-b".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_re_add_failures_never_escalate() {
        let proxy = RecordingProxy::new();
        proxy.fail_adds.store(true, Ordering::SeqCst);
        let client = client_with(&proxy, DirectoryConfig::default());

        let mut gbids = std::collections::HashMap::new();
        gbids.insert("p-1".to_string(), vec!["backend-a".to_string()]);
        let store = Arc::new(FixedStore {
            entries: vec![DiscoveryEntry::new(
                "p-1",
                "domain",
                "test/Interface",
                Version::new(1, 0),
                ProviderQos::default(),
            )],
            gbids,
        });

        assert_eq!(
            client.re_add(store, "local-address").await,
            Ok(()),
            "re_add is best-effort and must resolve Ok"
        );
        assert_eq!(proxy.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_participant_wraps_the_single_result() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());

        let result = client
            .lookup_participant("p-42", vec!["backend-a".into()], Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].participant_id(), "p-42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_uses_the_caller_supplied_ttl() {
        let proxy = RecordingProxy::new();
        let client = client_with(&proxy, DirectoryConfig::default());

        client
            .lookup(
                vec!["domain".into()],
                "test/Interface",
                vec!["backend-a".into(), "backend-b".into()],
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        let calls = proxy.calls();
        assert_eq!(calls[0].0, "lookup_domains");
        assert_eq!(calls[0].1.ttl(), Duration::from_secs(5));
        assert_eq!(calls[0].1.gbid(), Some("backend-a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_uses_the_freshness_ttl() {
        let proxy = RecordingProxy::new();
        let cfg = DirectoryConfig::default();
        let touch_ttl = cfg.touch_ttl;
        let client = client_with(&proxy, cfg);

        client
            .touch("cc-1", vec!["p-1".into(), "p-2".into()], "backend-a")
            .await
            .unwrap();

        let calls = proxy.calls();
        assert_eq!(calls[0].0, "touch");
        assert_eq!(calls[0].1.ttl(), touch_ttl);
        assert_eq!(calls[0].1.gbid(), Some("backend-a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_stale_uses_the_long_fixed_ttl() {
        let proxy = RecordingProxy::new();
        let cfg = DirectoryConfig::default();
        let remove_stale_ttl = cfg.remove_stale_ttl;
        let client = client_with(&proxy, cfg);

        client
            .remove_stale("cc-1", 1_700_000_000_000, "backend-a")
            .await
            .unwrap();

        let calls = proxy.calls();
        assert_eq!(calls[0].0, "remove_stale");
        assert_eq!(calls[0].1.ttl(), remove_stale_ttl);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_without_proxy_fails_with_proxy_unavailable() {
        let client = DirectoryClient::new(DirectoryConfig::default(), Bus::new(64));

        let err = client
            .lookup(
                vec!["domain".into()],
                "test/Interface",
                vec!["backend-a".into()],
                Duration::from_secs(5),
            )
            .await
            .unwrap_err();

        assert_eq!(err, CallError::Runtime(RuntimeError::ProxyUnavailable));
    }
}
