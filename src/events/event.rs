//! # Runtime events emitted by the directory client and the arbitrator.
//!
//! The [`EventKind`] enum classifies events across the subsystem's flows:
//! provider registration (`Add*`, `ReAdd*`), deregistration (`Remove*`),
//! freshness (`TouchFailed`, `RemoveStaleFailed`), and provider selection
//! (`Arbitration*`, `ProviderSelected`).
//!
//! The [`Event`] struct carries optional metadata (participant, interface,
//! GBID, reason, attempt) set per kind via `with_*` builders.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically; use it to restore order when events are observed on
//! different subscriber queues.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Provider registration ===
    /// A queued registration hit its deadline before being processed.
    ///
    /// Sets: `participant`, `at`, `seq`.
    AddExpired,

    /// A registration was accepted by the directory.
    ///
    /// Sets: `participant`, `gbid`, `at`, `seq`.
    AddSucceeded,

    /// A registration was rejected by the directory (application error).
    ///
    /// Sets: `participant`, `reason`, `at`, `seq`.
    AddRejected,

    /// A registration failed at the transport layer.
    ///
    /// Sets: `participant`, `reason`, `at`, `seq`.
    AddFailed,

    // === Re-announce (re-add) ===
    /// An entry was skipped during re-announce because the local store holds
    /// no GBIDs for it.
    ///
    /// Sets: `participant`, `at`, `seq`.
    ReAddSkipped,

    /// One entry was successfully re-announced.
    ///
    /// Sets: `participant`, `at`, `seq`.
    ReAddSucceeded,

    /// One entry failed to re-announce; the batch continues regardless.
    ///
    /// Sets: `participant`, `reason`, `at`, `seq`.
    ReAddFailed,

    /// The whole re-announce batch is accounted for.
    ///
    /// Sets: `at`, `seq`.
    ReAddCompleted,

    // === Provider removal ===
    /// A timed-out remove RPC is being retried.
    ///
    /// Sets: `participant`, `attempt`, `at`, `seq`.
    RemoveRetried,

    /// A remove retry loop stopped because the directory proxy is gone.
    ///
    /// Sets: `participant`, `at`, `seq`.
    RemoveAborted,

    /// A removal was accepted by the directory.
    ///
    /// Sets: `participant`, `attempt`, `at`, `seq`.
    RemoveSucceeded,

    /// A removal was rejected by the directory (application error).
    ///
    /// Sets: `participant`, `reason`, `at`, `seq`.
    RemoveRejected,

    /// A removal failed at the transport layer with a non-timeout error.
    ///
    /// Sets: `participant`, `reason`, `at`, `seq`.
    RemoveFailed,

    // === Freshness ===
    /// A touch keepalive batch failed.
    ///
    /// Sets: `gbid`, `reason`, `at`, `seq`.
    TouchFailed,

    /// A stale-purge instruction failed.
    ///
    /// Sets: `gbid`, `reason`, `at`, `seq`.
    RemoveStaleFailed,

    // === Arbitration ===
    /// An arbitration attempt started.
    ///
    /// Sets: `interface`, `reason` (joined domains), `at`, `seq`.
    ArbitrationStarted,

    /// Arbitration selected a provider; the listener has been notified.
    ///
    /// Sets: `participant`, `interface`, `at`, `seq`.
    ProviderSelected,

    /// Arbitration finished without an eligible provider.
    ///
    /// Sets: `interface`, `reason`, `at`, `seq`.
    ArbitrationFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Participant id, if applicable.
    pub participant: Option<Arc<str>>,
    /// Interface name, if applicable.
    pub interface: Option<Arc<str>>,
    /// Target GBID, if applicable.
    pub gbid: Option<Arc<str>>,
    /// Human-readable reason (error messages, domain lists).
    pub reason: Option<Arc<str>>,
    /// Attempt count (starting from 1) for retried operations.
    pub attempt: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            participant: None,
            interface: None,
            gbid: None,
            reason: None,
            attempt: None,
        }
    }

    /// Attaches a participant id.
    #[inline]
    pub fn with_participant(mut self, participant: impl Into<Arc<str>>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    /// Attaches an interface name.
    #[inline]
    pub fn with_interface(mut self, interface: impl Into<Arc<str>>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    /// Attaches a GBID.
    #[inline]
    pub fn with_gbid(mut self, gbid: impl Into<Arc<str>>) -> Self {
        self.gbid = Some(gbid.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }
}
