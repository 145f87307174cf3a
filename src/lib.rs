//! # provisor
//!
//! **Provisor** is the provider-arbitration and capabilities-directory client
//! subsystem of an RPC cluster controller: the broker-side logic that decides
//! *which* provider a proxy binds to, and keeps the remote capabilities
//! directory in sync with local provider state.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  proxy creation                      provider registration / keepalive
//!        │                                            │
//!        ▼                                            ▼
//! ┌──────────────────┐              ┌─────────────────────────────────────┐
//! │    Arbitrator    │              │          DirectoryClient            │
//! │  - one lookup    │              │  add / re_add / remove  ──► queued  │
//! │  - one selection │              │  lookup / touch / stale ──► direct  │
//! └───────┬──────────┘              └───────┬─────────────────┬───────────┘
//!         │ SelectionPolicy                  ▼                │
//!         │ (QoS-based)               ┌────────────┐          │
//!         ▼                           │ TaskQueue  │          │
//! ┌──────────────────┐               │ one task   │          │
//! │    Discovery     │               │ at a time, │          │
//! │ (consumed trait) │               │ deadlines  │          │
//! └──────────────────┘               └─────┬──────┘          │
//!                                          ▼                 ▼
//!                                   ┌─────────────────────────────┐
//!                                   │  DirectoryProxy (consumed)  │
//!                                   │  remote directory transport │
//!                                   └─────────────────────────────┘
//!
//! Observability: every component publishes Events to a shared Bus;
//! attach a SubscriberSet (LogWriter, metrics, ...) to consume them.
//! ```
//!
//! ### Ordering model
//! ```text
//! add / re_add / remove   strictly serialized, submission order, never overlap
//! lookup / touch / stale  direct async calls, no ordering guarantee
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / traits                         |
//! |------------------|-----------------------------------------------------------|--------------------------------------------|
//! | **Arbitration**  | Select one provider per (domains, interface, version).    | [`Arbitrator`], [`SelectionPolicy`]        |
//! | **Directory**    | Register, look up, keep alive, and purge provider entries.| [`DirectoryClient`], [`DirectoryProxy`]    |
//! | **Sequencing**   | Ordered, deadlined execution of mutating operations.      | [`TaskQueue`], [`SequencedTask`]           |
//! | **Errors**       | Typed errors per failure plane.                           | [`CallError`], [`ArbitrationError`]        |
//! | **Observability**| Event bus with non-blocking subscriber fan-out.           | [`Bus`], [`Event`], [`Subscribe`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use provisor::{
//!     Bus, CallError, DirectoryClient, DirectoryConfig, DirectoryProxy, DiscoveryEntry,
//!     GlobalDiscoveryEntry, MessagingQos, ProviderQos, RuntimeError, Version,
//! };
//!
//! // A transport layer provides the proxy; a trivial stand-in here.
//! struct LoopbackDirectory;
//!
//! #[async_trait]
//! impl DirectoryProxy for LoopbackDirectory {
//!     async fn add(&self, _e: GlobalDiscoveryEntry, _g: Vec<String>, _q: MessagingQos)
//!         -> Result<(), CallError> { Ok(()) }
//!     async fn remove(&self, _p: String, _g: Vec<String>, _q: MessagingQos)
//!         -> Result<(), CallError> { Ok(()) }
//!     async fn lookup_domains(&self, _d: Vec<String>, _i: String, _g: Vec<String>, _q: MessagingQos)
//!         -> Result<Vec<GlobalDiscoveryEntry>, CallError> { Ok(Vec::new()) }
//!     async fn lookup_participant(&self, _p: String, _g: Vec<String>, _q: MessagingQos)
//!         -> Result<GlobalDiscoveryEntry, CallError> {
//!         Err(CallError::Runtime(RuntimeError::Transport { message: "not found".into() }))
//!     }
//!     async fn touch(&self, _c: String, _p: Vec<String>, _q: MessagingQos)
//!         -> Result<(), RuntimeError> { Ok(()) }
//!     async fn remove_stale(&self, _c: String, _m: i64, _q: MessagingQos)
//!         -> Result<(), RuntimeError> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = Bus::default();
//!     let client = DirectoryClient::new(DirectoryConfig::default(), bus.clone());
//!     client.set_proxy(Arc::new(LoopbackDirectory));
//!
//!     // Register a provider; the completion resolves once the RPC finished.
//!     let entry = GlobalDiscoveryEntry::from_local(
//!         DiscoveryEntry::new(
//!             "participant-1",
//!             "vehicle",
//!             "vehicle/Radio",
//!             Version::new(1, 0),
//!             ProviderQos::default(),
//!         ),
//!         "mqtt://broker/node-1",
//!     );
//!     client
//!         .add(entry, vec!["backend-a".into()])
//!         .await
//!         .expect("registration failed");
//!
//!     // Keep it fresh and look it up directly.
//!     client.touch("cc-1", vec!["participant-1".into()], "backend-a").await.ok();
//!     let found = client
//!         .lookup_participant("participant-1", vec!["backend-a".into()], Duration::from_secs(5))
//!         .await;
//!     let _ = found;
//! }
//! ```
mod arbitration;
mod config;
mod directory;
mod error;
mod events;
mod qos;
mod queue;
mod subscribers;
mod types;

// ---- Public re-exports ----

pub use arbitration::{
    ArbitrationListener, ArbitrationState, Arbitrator, Discovery, QosSelectionPolicy,
    SelectionPolicy,
};
pub use config::DirectoryConfig;
pub use directory::{CapabilitiesStore, Completion, DirectoryClient, DirectoryProxy};
pub use error::{ArbitrationError, CallError, DiscoveryError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use qos::{DiscoveryQos, DiscoveryScope, MessagingQos, GBID_HEADER};
pub use queue::{SequencedTask, TaskQueue};
pub use subscribers::{Subscribe, SubscriberSet};
pub use types::{
    CustomParameter, DiscoveryEntry, GlobalDiscoveryEntry, ProviderQos, ProviderScope, Version,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
