//! Error types for host calls and sync orchestration

use syncline_reconcile::ReconcileError;

/// A failed call into the plugin host
///
/// Host mutation failures are not recovered and partial applications are
/// not rolled back; the idempotent re-sync heals on retry.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host reported a failure for one call
    #[error("host call `{call}` failed: {message}")]
    CallFailed {
        /// Which bridge method failed
        call: &'static str,
        /// The host's error message
        message: String,
    },

    /// The bridge to the host is gone; nothing further can be done
    #[error("plugin host connection closed")]
    Disconnected,
}

impl HostError {
    /// Build a call failure
    #[inline]
    #[must_use]
    pub fn call_failed(call: &'static str, message: impl Into<String>) -> Self {
        Self::CallFailed {
            call,
            message: message.into(),
        }
    }
}

/// Top-level sync error
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A sync is already running; the submit control should be disabled
    #[error("a sync is already running")]
    SyncInProgress,

    /// No data source has been selected for this collection
    #[error("no data source selected")]
    MissingDataSource,

    /// The reconciliation pass rejected its inputs
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// A host call failed
    #[error(transparent)]
    Host(#[from] HostError),
}

impl EngineError {
    /// Configuration errors are caught before any mutation and surfaced
    /// to the user without closing the plugin
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingDataSource | Self::Reconcile(_))
    }

    /// Fatal errors end the session via `close_plugin`
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Host(HostError::Disconnected))
    }
}
