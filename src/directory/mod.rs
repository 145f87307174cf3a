//! # Capabilities-directory client.
//!
//! The single integration point between local provider state and the remote
//! global capabilities directory.
//!
//! Internal modules:
//! - [`proxy`]: the consumed async boundary to the remote directory;
//! - [`store`]: the consumed boundary to the local capabilities store;
//! - [`client`]: [`DirectoryClient`] - queued mutating operations and direct
//!   lookups/keepalives;
//! - [`retry`]: the remove operation's timeout-retry loop.

mod client;
mod proxy;
mod retry;
mod store;

pub use client::{Completion, DirectoryClient};
pub use proxy::DirectoryProxy;
pub use store::CapabilitiesStore;
