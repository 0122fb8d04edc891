//! Error types for device connection management.
//!
//! Transport failures (dial, read, write) are recovered inside the manager by
//! reconnecting. Only the caller whose write observed the failure sees it as
//! an error.

use relaypanel_protocol::ProtocolError;

use crate::types::DeviceName;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while talking to relay and buzzer controllers.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Relay id outside `'1'..'8'`.
    #[error("Invalid relay id: {id:?}")]
    InvalidRelayId { id: String },

    /// Relay label index outside the table.
    #[error("Invalid relay label index: {index}")]
    InvalidLabelIndex { index: usize },

    /// No live connection for the device.
    #[error("{device} not connected")]
    NotConnected { device: DeviceName },

    /// Writing a command failed; the connection has been torn down.
    #[error("Write to {device} failed: {source}")]
    WriteFailed {
        device: DeviceName,
        #[source]
        source: std::io::Error,
    },

    /// Dial attempt failed.
    #[error("Failed to connect to {target}: {reason}")]
    DialFailed { target: String, reason: String },

    /// Dial attempt did not complete in time.
    #[error("Connecting to {target} timed out after {timeout_ms}ms")]
    DialTimeout { target: String, timeout_ms: u64 },

    /// Reconnection was needed but no dialer was installed.
    #[error("No dialer registered for {device}")]
    NoDialer { device: DeviceName },

    /// Transport address could not be parsed.
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Serial port error.
    #[cfg(feature = "serial")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Protocol framing or parsing error.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new not connected error.
    pub fn not_connected(device: DeviceName) -> Self {
        Self::NotConnected { device }
    }

    /// Create a new write failed error.
    pub fn write_failed(device: DeviceName, source: std::io::Error) -> Self {
        Self::WriteFailed { device, source }
    }

    /// Create a new dial failed error.
    pub fn dial_failed(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::DialFailed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new dial timeout error.
    pub fn dial_timeout(target: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::DialTimeout {
            target: target.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Create a new invalid address error.
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by caller input rather than the device.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRelayId { .. } | Self::InvalidLabelIndex { .. }
        )
    }
}
