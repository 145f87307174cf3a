//! Error types used by the directory client and the arbitrator.
//!
//! This module defines four error enums, one per failure plane:
//!
//! - [`DiscoveryError`] - application-level rejections returned by the remote
//!   capabilities directory (the operation reached the backend and was refused).
//! - [`RuntimeError`] - transport and scheduling failures (the operation never
//!   produced a backend verdict: timeouts, missing proxy, cancellation).
//! - [`CallError`] - the combined outcome type of every directory RPC; exactly
//!   one of the two planes above.
//! - [`ArbitrationError`] - provider-selection failures, surfaced as
//!   diagnosable messages rather than panics.
//!
//! All types provide `as_label()` returning a short stable snake_case label
//! for logs/metrics. [`RuntimeError::is_retryable`] marks the single error
//! class the remove operation retries on.

use std::time::Duration;

use thiserror::Error;

use crate::types::Version;

/// # Application-level errors returned by the capabilities directory.
///
/// These mirror the backend's structured rejection codes: the request was
/// delivered and processed, and the directory refused it. They are terminal;
/// no operation retries on an application error.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The targeted GBID is not known to the backend.
    #[error("unknown GBID")]
    UnknownGbid,

    /// The supplied GBID (or GBID list) is malformed or empty.
    #[error("invalid GBID")]
    InvalidGbid,

    /// The directory failed internally while processing the request.
    #[error("internal error in capabilities directory")]
    InternalError,

    /// No entry exists for the requested participant id.
    #[error("no entry for participant")]
    NoEntryForParticipant,

    /// No entry exists in any of the selected backends.
    #[error("no entry for the selected backends")]
    NoEntryForSelectedBackends,
}

impl DiscoveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use provisor::DiscoveryError;
    ///
    /// assert_eq!(DiscoveryError::UnknownGbid.as_label(), "unknown_gbid");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DiscoveryError::UnknownGbid => "unknown_gbid",
            DiscoveryError::InvalidGbid => "invalid_gbid",
            DiscoveryError::InternalError => "internal_error",
            DiscoveryError::NoEntryForParticipant => "no_entry_for_participant",
            DiscoveryError::NoEntryForSelectedBackends => "no_entry_for_selected_backends",
        }
    }
}

/// # Transport and scheduling failures.
///
/// These represent operations that never produced a backend verdict. Only
/// [`RuntimeError::Timeout`] is retryable; everything else is terminal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// The RPC did not complete within its messaging TTL.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The TTL that was exceeded.
        timeout: Duration,
    },

    /// The queued operation's deadline elapsed before it was processed.
    #[error("failed to process in time, please try again")]
    Expired,

    /// The directory proxy has been dropped or was never set.
    #[error("directory proxy not available")]
    ProxyUnavailable,

    /// The operation was canceled by client shutdown.
    #[error("operation canceled")]
    Canceled,

    /// Any other transport-level failure, with the underlying message.
    #[error("transport failure: {message}")]
    Transport {
        /// The underlying error message.
        message: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Timeout { .. } => "timeout",
            RuntimeError::Expired => "expired",
            RuntimeError::ProxyUnavailable => "proxy_unavailable",
            RuntimeError::Canceled => "canceled",
            RuntimeError::Transport { .. } => "transport",
        }
    }

    /// Indicates whether the error class is safe to retry.
    ///
    /// Returns `true` only for [`RuntimeError::Timeout`]: the remove operation
    /// assumes idempotence and retries timed-out requests, while every other
    /// failure is forwarded to the caller once.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use provisor::RuntimeError;
    ///
    /// let timeout = RuntimeError::Timeout { timeout: Duration::from_secs(60) };
    /// assert!(timeout.is_retryable());
    /// assert!(!RuntimeError::ProxyUnavailable.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, RuntimeError::Timeout { .. })
    }
}

/// # Combined outcome of a directory RPC.
///
/// Every call against the remote directory resolves to `Result<T, CallError>`:
/// either the backend rejected it ([`CallError::Rejected`]) or it failed
/// before producing a verdict ([`CallError::Runtime`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The directory processed and refused the operation.
    #[error("directory rejected the operation: {0}")]
    Rejected(#[from] DiscoveryError),

    /// The operation failed at the transport or scheduling layer.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl CallError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::Rejected(e) => e.as_label(),
            CallError::Runtime(e) => e.as_label(),
        }
    }

    /// True if this is a timeout-class runtime failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CallError::Runtime(RuntimeError::Timeout { .. }))
    }
}

/// # Provider-selection failures.
///
/// Arbitration failures are reported as descriptive, diagnosable messages,
/// never as panics: the distinct variants exist to tell an operator *why* no
/// provider qualified (missing registration vs. version drift vs. QoS
/// mismatch).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationError {
    /// Discovery returned no entries at all for the domain/interface pair.
    #[error("no provider entries found for domain [{domains}], interface {interface}")]
    NoEntries {
        /// Comma-joined domain list that was looked up.
        domains: String,
        /// Interface name that was looked up.
        interface: String,
    },

    /// Entries were found, but every one of them lacked support for
    /// on-change subscriptions while the discovery QoS required it.
    #[error("provider entries were found, but none supported on-change subscriptions")]
    NoSupportForOnChange,

    /// Compatible entries were found, but none carried a priority above the
    /// initial best of -1.
    #[error("provider entries were found, but none of the compatible entries had a priority above -1")]
    NoPositivePriority,

    /// Entries were found, but every candidate carried an incompatible
    /// provider version.
    #[error("provider entries were found, but none was compatible (discovered versions: {discovered:?})")]
    NoneCompatible {
        /// Distinct incompatible provider versions seen during the scan.
        discovered: Vec<Version>,
    },

    /// The discovery lookup itself failed; arbitration converts the
    /// underlying error instead of propagating it.
    #[error("unable to look up providers for domain [{domains}], interface {interface}: {reason}")]
    Discovery {
        /// Comma-joined domain list that was looked up.
        domains: String,
        /// Interface name that was looked up.
        interface: String,
        /// Message of the underlying discovery failure.
        reason: String,
    },
}

impl ArbitrationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ArbitrationError::NoEntries { .. } => "no_entries",
            ArbitrationError::NoSupportForOnChange => "no_support_for_on_change",
            ArbitrationError::NoPositivePriority => "no_positive_priority",
            ArbitrationError::NoneCompatible { .. } => "none_compatible",
            ArbitrationError::Discovery { .. } => "discovery_failure",
        }
    }
}
