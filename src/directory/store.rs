//! Boundary to the local capabilities store.

use crate::types::DiscoveryEntry;

/// Read access to the cluster controller's local provider registrations.
///
/// Consumed by [`DirectoryClient::re_add`](crate::DirectoryClient::re_add) to
/// re-announce everything that should be globally visible. Calls are
/// synchronous; implementations back them with in-memory state.
pub trait CapabilitiesStore: Send + Sync + 'static {
    /// All locally registered entries with global visibility.
    fn all_global_capabilities(&self) -> Vec<DiscoveryEntry>;

    /// The GBIDs a participant was registered under; empty if unknown.
    fn gbids_for_participant(&self, participant_id: &str) -> Vec<String>;
}
