//! # Arbitrator: one discovery lookup, one selection, one verdict.
//!
//! ## State machine
//! ```text
//! NotStarted ──► InProgress ──► Succeeded (listener notified, exactly once)
//!                           └─► Failed    (error retrievable, listener silent)
//! ```
//!
//! An arbitrator makes exactly one attempt: it issues a single discovery
//! lookup and runs the selection policy over the results. There is no retry
//! at this layer - when and whether to arbitrate again is the caller's
//! decision, made with the error in hand. A failed discovery call is
//! converted into an [`ArbitrationError::Discovery`] carrying the domain,
//! interface, and the underlying error message; it never propagates as a
//! panic or a raw transport error.
//!
//! The terminal verdict is sticky: further `attempt_arbitration` calls return
//! the stored outcome without touching discovery again, which also guarantees
//! the listener fires at most once.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ArbitrationError, CallError};
use crate::events::{Bus, Event, EventKind};
use crate::qos::DiscoveryQos;
use crate::types::{DiscoveryEntry, Version};

use super::policy::{QosSelectionPolicy, SelectionPolicy};

/// Consumed boundary to the discovery subsystem.
///
/// One lookup per arbitration attempt; errors are converted, not propagated.
#[async_trait]
pub trait Discovery: Send + Sync + 'static {
    /// Looks up all providers of `interface_name` in `domains`.
    async fn lookup(
        &self,
        domains: &[String],
        interface_name: &str,
        qos: &DiscoveryQos,
    ) -> Result<Vec<DiscoveryEntry>, CallError>;
}

/// Exposed boundary notified of the single arbitration winner.
pub trait ArbitrationListener: Send + Sync + 'static {
    /// Called exactly once with the winning participant id.
    fn on_provider_selected(&self, participant_id: &str);
}

/// Lifecycle of one arbitrator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbitrationState {
    /// No attempt has been made yet.
    NotStarted,
    /// An attempt is currently running.
    InProgress,
    /// A winner was selected and the listener notified.
    Succeeded,
    /// The attempt finished without an eligible provider.
    Failed,
}

/// Selects one provider for a (domains, interface, version) triple.
///
/// Constructed with the QoS-based policy by default; swap in another
/// [`SelectionPolicy`] via [`Arbitrator::with_policy`].
pub struct Arbitrator {
    domains: Vec<String>,
    interface_name: String,
    interface_version: Version,
    discovery: Arc<dyn Discovery>,
    discovery_qos: DiscoveryQos,
    policy: Box<dyn SelectionPolicy>,
    listener: Arc<dyn ArbitrationListener>,
    bus: Bus,
    state: ArbitrationState,
    outcome: Option<Result<String, ArbitrationError>>,
}

impl Arbitrator {
    /// Creates an arbitrator with the QoS-based selection policy.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        domains: Vec<String>,
        interface_name: impl Into<String>,
        interface_version: Version,
        discovery: Arc<dyn Discovery>,
        discovery_qos: DiscoveryQos,
        listener: Arc<dyn ArbitrationListener>,
        bus: Bus,
    ) -> Self {
        Self {
            domains,
            interface_name: interface_name.into(),
            interface_version,
            discovery,
            discovery_qos,
            policy: Box::new(QosSelectionPolicy),
            listener,
            bus,
            state: ArbitrationState::NotStarted,
            outcome: None,
        }
    }

    /// Replaces the selection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Box<dyn SelectionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ArbitrationState {
        self.state
    }

    /// The failure of a finished attempt, if it failed.
    pub fn error(&self) -> Option<&ArbitrationError> {
        match &self.outcome {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// Runs one arbitration attempt.
    ///
    /// On success the listener receives the winning participant id before
    /// this method returns. Once a terminal state is reached the stored
    /// verdict is returned on every further call; discovery is not consulted
    /// again and the listener is never re-notified.
    pub async fn attempt_arbitration(&mut self) -> Result<String, ArbitrationError> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        self.state = ArbitrationState::InProgress;
        self.bus.publish(
            Event::new(EventKind::ArbitrationStarted)
                .with_interface(self.interface_name.as_str())
                .with_reason(self.joined_domains()),
        );

        let outcome = self.run_attempt().await;
        match &outcome {
            Ok(participant_id) => {
                self.state = ArbitrationState::Succeeded;
                self.listener.on_provider_selected(participant_id);
                self.bus.publish(
                    Event::new(EventKind::ProviderSelected)
                        .with_interface(self.interface_name.as_str())
                        .with_participant(participant_id.as_str()),
                );
            }
            Err(e) => {
                self.state = ArbitrationState::Failed;
                self.bus.publish(
                    Event::new(EventKind::ArbitrationFailed)
                        .with_interface(self.interface_name.as_str())
                        .with_reason(e.to_string()),
                );
            }
        }

        self.outcome = Some(outcome.clone());
        outcome
    }

    async fn run_attempt(&self) -> Result<String, ArbitrationError> {
        let entries = self
            .discovery
            .lookup(&self.domains, &self.interface_name, &self.discovery_qos)
            .await
            .map_err(|e| ArbitrationError::Discovery {
                domains: self.joined_domains(),
                interface: self.interface_name.clone(),
                reason: e.to_string(),
            })?;

        if entries.is_empty() {
            return Err(ArbitrationError::NoEntries {
                domains: self.joined_domains(),
                interface: self.interface_name.clone(),
            });
        }

        self.policy
            .select(&self.discovery_qos, &self.interface_version, &entries)
    }

    fn joined_domains(&self) -> String {
        self.domains.join(", ")
    }
}
