//! # Quality-of-service settings for messaging and discovery.
//!
//! - [`MessagingQos`] - per-RPC time-to-live and custom headers (GBID routing)
//! - [`DiscoveryQos`] - constraints a consumer puts on discovery lookups

mod discovery;
mod messaging;

pub use discovery::{DiscoveryQos, DiscoveryScope};
pub use messaging::{MessagingQos, GBID_HEADER};
