//! Discovery entries: the records the capabilities directory stores.

use crate::types::{ProviderQos, Version};

/// # One registered provider instance.
///
/// Produced by the discovery backend and by local provider registration.
/// Immutable once returned from a lookup; many entries may share the same
/// domain + interface pair (that is what arbitration resolves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEntry {
    /// Identity of the concrete provider instance.
    pub participant_id: String,
    /// Domain the provider is registered under.
    pub domain: String,
    /// Fully qualified interface name.
    pub interface_name: String,
    /// Version the provider implements.
    pub provider_version: Version,
    /// Provider quality-of-service metadata.
    pub qos: ProviderQos,
    /// Wall-clock milliseconds of the last freshness update (touch).
    pub last_seen_ms: i64,
    /// Wall-clock milliseconds after which the entry may be purged.
    pub expiry_ms: i64,
}

impl DiscoveryEntry {
    /// Creates an entry with zeroed freshness timestamps.
    pub fn new(
        participant_id: impl Into<String>,
        domain: impl Into<String>,
        interface_name: impl Into<String>,
        provider_version: Version,
        qos: ProviderQos,
    ) -> Self {
        Self {
            participant_id: participant_id.into(),
            domain: domain.into(),
            interface_name: interface_name.into(),
            provider_version,
            qos,
            last_seen_ms: 0,
            expiry_ms: 0,
        }
    }
}

/// # A discovery entry registered for cross-node visibility.
///
/// Carries the serialized global transport address under which the provider
/// is reachable from other nodes. Created when a local registration is
/// mirrored to the remote directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalDiscoveryEntry {
    /// The underlying provider record.
    pub entry: DiscoveryEntry,
    /// Serialized global transport address of the hosting node.
    pub address: String,
}

impl GlobalDiscoveryEntry {
    /// Promotes a local entry to a global one under `address`.
    pub fn from_local(entry: DiscoveryEntry, address: impl Into<String>) -> Self {
        Self {
            entry,
            address: address.into(),
        }
    }

    /// Convenience accessor for the participant id.
    pub fn participant_id(&self) -> &str {
        &self.entry.participant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_local_keeps_entry_and_sets_address() {
        let entry = DiscoveryEntry::new(
            "p-1",
            "domain",
            "test/Interface",
            Version::new(1, 0),
            ProviderQos::default(),
        );
        let global = GlobalDiscoveryEntry::from_local(entry.clone(), "mqtt://broker/topic");
        assert_eq!(global.entry, entry);
        assert_eq!(global.address, "mqtt://broker/topic");
        assert_eq!(global.participant_id(), "p-1");
    }
}
