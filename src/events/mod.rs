//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the directory client, the retry
//! remove operation, and the arbitrator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! Components receive a `Bus` clone at construction; there is no global
//! logger. Attach a [`SubscriberSet`](crate::SubscriberSet) to render or
//! export events.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
