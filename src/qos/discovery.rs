//! Discovery-scoped quality-of-service.

use std::collections::HashMap;
use std::time::Duration;

/// Which caches/backends a discovery lookup may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryScope {
    /// Local store only.
    LocalOnly,
    /// Local store first; fall back to the global directory on a miss.
    #[default]
    LocalThenGlobal,
    /// Merge local and global results.
    LocalAndGlobal,
    /// Global directory only.
    GlobalOnly,
}

/// Constraints a consumer places on a discovery lookup.
///
/// The arbitrator evaluates
/// [`provider_must_support_on_change`](DiscoveryQos::provider_must_support_on_change)
/// as a hard filter; [`custom_parameters`](DiscoveryQos::custom_parameters)
/// are read by selection policies that need extra input (the QoS-based policy
/// ignores them).
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQos {
    /// Upper bound on the whole discovery interaction.
    pub discovery_timeout: Duration,
    /// Maximum age of cached entries the lookup may return.
    pub cache_max_age: Duration,
    /// Which caches/backends to consult.
    pub scope: DiscoveryScope,
    /// Reject providers that cannot serve on-change subscriptions.
    pub provider_must_support_on_change: bool,
    /// Opaque policy parameters.
    pub custom_parameters: HashMap<String, String>,
}

impl Default for DiscoveryQos {
    /// Defaults: 30s timeout, no cache-age limit relaxation (0), local-then-
    /// global scope, on-change support not required.
    fn default() -> Self {
        Self {
            discovery_timeout: Duration::from_secs(30),
            cache_max_age: Duration::ZERO,
            scope: DiscoveryScope::default(),
            provider_must_support_on_change: false,
            custom_parameters: HashMap::new(),
        }
    }
}

impl DiscoveryQos {
    /// Returns the named custom parameter, if present.
    pub fn custom_parameter(&self, name: &str) -> Option<&str> {
        self.custom_parameters.get(name).map(String::as_str)
    }

    /// Returns a copy requiring on-change subscription support.
    #[inline]
    pub fn require_on_change_support(mut self) -> Self {
        self.provider_must_support_on_change = true;
        self
    }
}
