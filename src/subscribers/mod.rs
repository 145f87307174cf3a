//! # Event subscribers: trait, fan-out set, and a reference log writer.
//!
//! Observability in this crate is event-driven: components publish
//! [`Event`](crate::Event)s to a [`Bus`](crate::Bus), and subscribers consume
//! them from per-subscriber bounded queues. Nothing in the hot path awaits a
//! subscriber.
//!
//! ## Contents
//! - [`Subscribe`] - the extension point for custom handlers (logging,
//!   metrics, alerting)
//! - [`SubscriberSet`] - non-blocking fan-out over multiple subscribers
//! - [`LogWriter`] - simple stdout renderer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
