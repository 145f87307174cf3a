//! Per-provider quality-of-service metadata.

/// Visibility scope of a provider registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderScope {
    /// Visible to local consumers only.
    Local,
    /// Mirrored to the global capabilities directory.
    #[default]
    Global,
}

/// A free-form key/value parameter attached to a provider registration.
///
/// Custom parameters are opaque to this crate; selection policies beyond the
/// QoS-based one (keyword matching, fixed participant) read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

/// # Quality-of-service metadata a provider registers with.
///
/// The QoS-based selection policy reads [`priority`](ProviderQos::priority)
/// (strictly higher wins) and
/// [`supports_on_change_subscriptions`](ProviderQos::supports_on_change_subscriptions)
/// (a hard filter when the consumer requires it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQos {
    /// Selection priority; higher values win arbitration. Values at or below
    /// -1 never win (the scan starts from a best of -1).
    pub priority: i64,
    /// Whether the provider can serve on-change subscriptions.
    pub supports_on_change_subscriptions: bool,
    /// Registration visibility.
    pub scope: ProviderScope,
    /// Opaque extension parameters.
    pub custom_parameters: Vec<CustomParameter>,
}

impl Default for ProviderQos {
    /// Defaults: priority 1, no on-change support, global scope, no
    /// custom parameters.
    fn default() -> Self {
        Self {
            priority: 1,
            supports_on_change_subscriptions: false,
            scope: ProviderScope::Global,
            custom_parameters: Vec::new(),
        }
    }
}

impl ProviderQos {
    /// Returns a copy with the given priority.
    #[inline]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Returns a copy with on-change subscription support toggled.
    #[inline]
    pub fn with_on_change_support(mut self, supported: bool) -> Self {
        self.supports_on_change_subscriptions = supported;
        self
    }
}
