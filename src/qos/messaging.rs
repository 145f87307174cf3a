//! # Messaging quality-of-service.
//!
//! Every directory RPC carries a [`MessagingQos`]: the time-to-live the
//! transport enforces on the message, and a custom-header map used for
//! backend routing. The one header this subsystem writes is
//! [`GBID_HEADER`], selecting which backend partition the operation targets.
//!
//! ## Rules
//! - Header puts replace existing values for the same key.
//! - The GBID header is always the **first** element of the supplied GBID
//!   list, even when the call accepts several GBIDs.

use std::collections::HashMap;
use std::time::Duration;

/// Custom message-header key carrying the target Global Backend Identifier.
pub const GBID_HEADER: &str = "gbid";

/// Per-message quality-of-service settings.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use provisor::{MessagingQos, GBID_HEADER};
///
/// let qos = MessagingQos::new(Duration::from_secs(30)).with_gbid("backend-a");
/// assert_eq!(qos.ttl(), Duration::from_secs(30));
/// assert_eq!(qos.gbid(), Some("backend-a"));
/// assert_eq!(qos.custom_headers().get(GBID_HEADER).map(String::as_str), Some("backend-a"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingQos {
    ttl: Duration,
    custom_headers: HashMap<String, String>,
}

impl Default for MessagingQos {
    /// Default time-to-live of 60 seconds, no custom headers.
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl MessagingQos {
    /// Creates a QoS with the given time-to-live and no custom headers.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            custom_headers: HashMap::new(),
        }
    }

    /// Returns the time-to-live.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replaces the time-to-live.
    #[inline]
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Returns a copy with the time-to-live replaced.
    #[inline]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Puts a custom header, replacing any existing value for the key.
    pub fn put_custom_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom_headers.insert(key.into(), value.into());
    }

    /// Returns a copy with the GBID routing header set.
    pub fn with_gbid(mut self, gbid: impl Into<String>) -> Self {
        self.put_custom_header(GBID_HEADER, gbid);
        self
    }

    /// Returns the GBID routing header, if set.
    pub fn gbid(&self) -> Option<&str> {
        self.custom_headers.get(GBID_HEADER).map(String::as_str)
    }

    /// Returns the full custom-header map.
    pub fn custom_headers(&self) -> &HashMap<String, String> {
        &self.custom_headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_custom_header_replaces_existing_value() {
        let mut qos = MessagingQos::default();
        qos.put_custom_header(GBID_HEADER, "first");
        qos.put_custom_header(GBID_HEADER, "second");
        assert_eq!(qos.gbid(), Some("second"));
        assert_eq!(qos.custom_headers().len(), 1);
    }

    #[test]
    fn test_with_ttl_overrides_default() {
        let qos = MessagingQos::default().with_ttl(Duration::from_millis(1500));
        assert_eq!(qos.ttl(), Duration::from_millis(1500));
    }
}
