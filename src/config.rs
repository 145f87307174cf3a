//! # Directory-client configuration.
//!
//! Provides [`DirectoryConfig`], the TTL knobs of the directory client.
//!
//! Three distinct TTLs exist on purpose:
//! - `message_ttl` bounds ordinary mutating/lookup RPCs **and** doubles as the
//!   queue deadline of `add` (a registration that cannot even start within its
//!   own TTL is reported as expired instead of being sent late);
//! - `touch_ttl` matches the freshness-update interval - a keepalive that
//!   arrives after the next interval is worthless, so it should die with it;
//! - `remove_stale_ttl` is deliberately long: a stale-purge instruction stays
//!   valid for an hour even if the backend is briefly unreachable.

use std::time::Duration;

/// TTL configuration for the directory client.
///
/// ## Field semantics
/// - `message_ttl`: TTL of add/remove/lookup RPCs and the `add` queue deadline.
/// - `touch_ttl`: TTL of `touch` keepalives; keep equal to the freshness-update
///   interval of the cluster controller.
/// - `remove_stale_ttl`: TTL of `remove_stale` purge instructions.
#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    /// TTL for ordinary directory RPCs (default 60s).
    pub message_ttl: Duration,
    /// TTL for freshness keepalives (default 6h, the freshness interval).
    pub touch_ttl: Duration,
    /// TTL for stale-entry purge instructions (default 1h).
    pub remove_stale_ttl: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            message_ttl: Duration::from_secs(60),
            touch_ttl: Duration::from_secs(6 * 60 * 60),
            remove_stale_ttl: Duration::from_secs(60 * 60),
        }
    }
}
