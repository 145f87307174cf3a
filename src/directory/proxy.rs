//! # Async boundary to the remote capabilities directory.
//!
//! The proxy is consumed, not implemented, by this crate: a transport layer
//! (MQTT, WebSocket, in-process test double) provides it. Every operation
//! takes a [`MessagingQos`] carrying the TTL and the GBID routing header, and
//! resolves to the combined [`CallError`]-based outcome.
//!
//! The client holds the proxy behind a rebindable slot
//! ([`DirectoryClient::set_proxy`](crate::DirectoryClient::set_proxy)); the
//! retry remove operation holds only a [`Weak`](std::sync::Weak) reference so
//! an in-flight retry never extends the proxy's lifetime.

use async_trait::async_trait;

use crate::error::{CallError, RuntimeError};
use crate::qos::MessagingQos;
use crate::types::GlobalDiscoveryEntry;

/// Remote capabilities-directory operations.
///
/// Implementations are expected to map transport timeouts to
/// [`RuntimeError::Timeout`]; the remove retry depends on that distinction.
#[async_trait]
pub trait DirectoryProxy: Send + Sync + 'static {
    /// Registers `entry` under the given GBIDs.
    async fn add(
        &self,
        entry: GlobalDiscoveryEntry,
        gbids: Vec<String>,
        qos: MessagingQos,
    ) -> Result<(), CallError>;

    /// Removes the registration of `participant_id` from the given GBIDs.
    async fn remove(
        &self,
        participant_id: String,
        gbids: Vec<String>,
        qos: MessagingQos,
    ) -> Result<(), CallError>;

    /// Looks up all providers of `interface_name` in `domains`.
    async fn lookup_domains(
        &self,
        domains: Vec<String>,
        interface_name: String,
        gbids: Vec<String>,
        qos: MessagingQos,
    ) -> Result<Vec<GlobalDiscoveryEntry>, CallError>;

    /// Looks up a single provider by participant id.
    async fn lookup_participant(
        &self,
        participant_id: String,
        gbids: Vec<String>,
        qos: MessagingQos,
    ) -> Result<GlobalDiscoveryEntry, CallError>;

    /// Marks a batch of participants as alive on behalf of a cluster
    /// controller.
    async fn touch(
        &self,
        cluster_controller_id: String,
        participant_ids: Vec<String>,
        qos: MessagingQos,
    ) -> Result<(), RuntimeError>;

    /// Purges entries of `cluster_controller_id` not seen since
    /// `max_last_seen_ms`.
    async fn remove_stale(
        &self,
        cluster_controller_id: String,
        max_last_seen_ms: i64,
        qos: MessagingQos,
    ) -> Result<(), RuntimeError>;
}
