//! # Selection policies over discovery results.
//!
//! A [`SelectionPolicy`] reduces a non-empty set of discovery entries to one
//! winning participant id, or explains why no entry qualified. Policies are
//! trait objects so further strategies (keyword matching, fixed participant)
//! can slot in behind the same interface.
//!
//! The shipped policy is [`QosSelectionPolicy`]: filter by on-change support
//! and version compatibility, then pick the highest provider priority.

use crate::error::ArbitrationError;
use crate::qos::DiscoveryQos;
use crate::types::{DiscoveryEntry, Version};

/// Reduces discovery entries to one winner.
///
/// `entries` is never empty; the arbitrator reports empty result sets itself
/// (their error message carries the domain/interface context a policy does
/// not have).
pub trait SelectionPolicy: Send + Sync + 'static {
    /// Selects the winning participant id.
    fn select(
        &self,
        qos: &DiscoveryQos,
        required_version: &Version,
        entries: &[DiscoveryEntry],
    ) -> Result<String, ArbitrationError>;
}

/// # QoS-based selection.
///
/// Scans entries in input order:
/// 1. entries lacking on-change support are skipped when the discovery QoS
///    requires it;
/// 2. entries with an incompatible provider version are skipped (major must
///    match, minor must be at least the required minor);
/// 3. of the rest, the strictly highest priority wins; on a tie the
///    earlier-encountered entry is kept. The scan starts from a best priority
///    of -1, so entries at or below -1 can never win.
///
/// When nothing wins, the skip tallies decide which failure is reported:
/// every entry skipped for on-change support, every entry incompatible, or
/// compatible entries present but none above the default priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct QosSelectionPolicy;

impl SelectionPolicy for QosSelectionPolicy {
    fn select(
        &self,
        qos: &DiscoveryQos,
        required_version: &Version,
        entries: &[DiscoveryEntry],
    ) -> Result<String, ArbitrationError> {
        let mut highest_priority: i64 = -1;
        let mut winner: Option<&DiscoveryEntry> = None;
        let mut without_on_change = 0usize;
        let mut incompatible_count = 0usize;
        let mut discovered_versions: Vec<Version> = Vec::new();

        for entry in entries {
            if qos.provider_must_support_on_change
                && !entry.qos.supports_on_change_subscriptions
            {
                without_on_change += 1;
                continue;
            }

            if !entry.provider_version.is_compatible_with(required_version) {
                incompatible_count += 1;
                if !discovered_versions.contains(&entry.provider_version) {
                    discovered_versions.push(entry.provider_version);
                }
                continue;
            }

            if entry.qos.priority > highest_priority {
                winner = Some(entry);
                highest_priority = entry.qos.priority;
            }
        }

        match winner {
            Some(entry) => Ok(entry.participant_id.clone()),
            None if without_on_change == entries.len() => {
                Err(ArbitrationError::NoSupportForOnChange)
            }
            None if without_on_change + incompatible_count < entries.len() => {
                Err(ArbitrationError::NoPositivePriority)
            }
            None => Err(ArbitrationError::NoneCompatible {
                discovered: discovered_versions,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderQos;

    fn entry(id: &str, version: Version, priority: i64, on_change: bool) -> DiscoveryEntry {
        DiscoveryEntry::new(
            id,
            "domain",
            "test/Interface",
            version,
            ProviderQos::default()
                .with_priority(priority)
                .with_on_change_support(on_change),
        )
    }

    fn required() -> Version {
        Version::new(1, 0)
    }

    #[test]
    fn test_highest_priority_wins() {
        let entries = vec![
            entry("low", Version::new(1, 0), 3, false),
            entry("high", Version::new(1, 0), 7, false),
            entry("mid", Version::new(1, 0), 5, false),
        ];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap();
        assert_eq!(winner, "high");
    }

    #[test]
    fn test_priority_tie_keeps_the_earlier_entry() {
        let entries = vec![
            entry("first", Version::new(1, 0), 5, false),
            entry("second", Version::new(1, 0), 5, false),
        ];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap();
        assert_eq!(winner, "first");
    }

    #[test]
    fn test_newer_minor_beats_lower_priority_filter() {
        // Spec example: A {priority 5, 1.0}, B {priority 9, 1.1}, both with
        // on-change support, required 1.0 -> B wins.
        let entries = vec![
            entry("A", Version::new(1, 0), 5, true),
            entry("B", Version::new(1, 1), 9, true),
        ];
        let qos = DiscoveryQos::default().require_on_change_support();
        let winner = QosSelectionPolicy.select(&qos, &required(), &entries).unwrap();
        assert_eq!(winner, "B");
    }

    #[test]
    fn test_incompatible_major_is_filtered_even_with_top_priority() {
        let entries = vec![
            entry("wrong-major", Version::new(2, 0), 100, false),
            entry("compatible", Version::new(1, 2), 1, false),
        ];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap();
        assert_eq!(winner, "compatible");
    }

    #[test]
    fn test_lower_minor_is_filtered() {
        let entries = vec![
            entry("old-minor", Version::new(2, 0), 9, false),
            entry("ok", Version::new(2, 1), 1, false),
        ];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &Version::new(2, 1), &entries)
            .unwrap();
        assert_eq!(winner, "ok");
    }

    #[test]
    fn test_all_entries_incompatible_reports_none_compatible() {
        let entries = vec![
            entry("a", Version::new(2, 0), 5, false),
            entry("b", Version::new(3, 1), 9, false),
            entry("c", Version::new(2, 0), 1, false),
        ];
        let err = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap_err();
        match err {
            ArbitrationError::NoneCompatible { discovered } => {
                assert_eq!(
                    discovered,
                    vec![Version::new(2, 0), Version::new(3, 1)],
                    "versions are recorded once each, in encounter order"
                );
            }
            other => panic!("expected NoneCompatible, got {other:?}"),
        }
    }

    #[test]
    fn test_all_entries_without_on_change_support_reports_that() {
        let entries = vec![
            entry("a", Version::new(1, 0), 5, false),
            entry("b", Version::new(1, 0), 9, false),
        ];
        let qos = DiscoveryQos::default().require_on_change_support();
        let err = QosSelectionPolicy.select(&qos, &required(), &entries).unwrap_err();
        assert_eq!(err, ArbitrationError::NoSupportForOnChange);
    }

    #[test]
    fn test_compatible_entries_below_default_priority_report_no_positive_priority() {
        let entries = vec![
            entry("negative", Version::new(1, 0), -1, false),
            entry("very-negative", Version::new(1, 0), -42, false),
        ];
        let err = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap_err();
        assert_eq!(err, ArbitrationError::NoPositivePriority);
    }

    #[test]
    fn test_mixed_skip_reasons_report_no_positive_priority() {
        // One entry skipped per reason plus one compatible-but-unselectable:
        // not *all* entries were incompatible, so the priority message wins.
        let entries = vec![
            entry("no-on-change", Version::new(1, 0), 5, false),
            entry("wrong-version", Version::new(2, 0), 5, true),
            entry("negative-priority", Version::new(1, 0), -1, true),
        ];
        let qos = DiscoveryQos::default().require_on_change_support();
        let err = QosSelectionPolicy.select(&qos, &required(), &entries).unwrap_err();
        assert_eq!(err, ArbitrationError::NoPositivePriority);
    }

    #[test]
    fn test_on_change_filter_is_inactive_when_not_required() {
        let entries = vec![entry("plain", Version::new(1, 0), 0, false)];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap();
        assert_eq!(winner, "plain");
    }

    #[test]
    fn test_zero_priority_beats_the_initial_best() {
        let entries = vec![entry("zero", Version::new(1, 0), 0, false)];
        let winner = QosSelectionPolicy
            .select(&DiscoveryQos::default(), &required(), &entries)
            .unwrap();
        assert_eq!(winner, "zero", "priority 0 is above the initial best of -1");
    }
}
