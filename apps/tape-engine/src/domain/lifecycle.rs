//! Connection Lifecycle State Machine
//!
//! Tracks connect/open/close/error transitions for one connection
//! instance and exposes the current status plus last error.
//!
//! `closed` and `error` are terminal for a connection instance; a fresh
//! session restarts at `connecting`. Error is sticky: a transport close
//! that lands after an error does not overwrite the observed status or
//! clear the error message.

use serde::{Deserialize, Serialize};

/// Fixed user-facing message surfaced on transport errors.
pub const STREAM_ERROR_MESSAGE: &str = "Unable to stream trades";

// =============================================================================
// Connection Status
// =============================================================================

/// Observable status of a connection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Establishment in progress.
    Connecting,
    /// Transport established, messages flowing.
    Open,
    /// Transport closed cleanly. Terminal; no automatic reconnect.
    Closed,
    /// Transport failed. Terminal and sticky for this instance.
    Error,
}

impl ConnectionStatus {
    /// Get the wire name for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Error => "error",
        }
    }
}

// =============================================================================
// Lifecycle State
// =============================================================================

/// Status and last-error holder for one connection instance.
///
/// Transitions never fail; an event that does not apply in the current
/// state is reported back as unchanged (`false`) and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleState {
    status: ConnectionStatus,
    error: Option<String>,
}

impl LifecycleState {
    /// Create the state for a new connection instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            error: None,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Last error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Transport established. Clears any prior error.
    ///
    /// Only applies while connecting; `closed` and `error` are terminal
    /// for this instance.
    pub fn open(&mut self) -> bool {
        if self.status != ConnectionStatus::Connecting {
            return false;
        }
        self.status = ConnectionStatus::Open;
        self.error = None;
        true
    }

    /// Transport closed.
    ///
    /// Ignored once an error has been observed: the transport is expected
    /// to emit a close shortly after an error, and that close must not
    /// regress the observable status.
    pub fn close(&mut self) -> bool {
        if matches!(self.status, ConnectionStatus::Error | ConnectionStatus::Closed) {
            return false;
        }
        self.status = ConnectionStatus::Closed;
        true
    }

    /// Transport failed. Sets the fixed user-facing error message.
    pub fn fail(&mut self) -> bool {
        if self.status == ConnectionStatus::Error {
            return false;
        }
        self.status = ConnectionStatus::Error;
        self.error = Some(STREAM_ERROR_MESSAGE.to_string());
        true
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
