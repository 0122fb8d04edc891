//! Error types for the TV remote.

use std::time::Duration;

/// Result type alias for TV remote operations.
pub type Result<T> = std::result::Result<T, TvError>;

/// Errors raised while driving the TV over ADB.
#[derive(Debug, thiserror::Error)]
pub enum TvError {
    /// Command name is not one of the supported remote buttons.
    #[error("Unknown TV command: {command:?}")]
    UnknownCommand { command: String },

    /// ADB target is not `host:port`.
    #[error("Invalid ADB target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The adb program could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// adb exited unsuccessfully.
    #[error("adb {step} failed ({status}): {output}")]
    CommandFailed {
        step: &'static str,
        status: String,
        output: String,
    },

    /// adb did not finish within the configured timeout.
    #[error("adb {step} timed out after {timeout_ms}ms")]
    Timeout { step: &'static str, timeout_ms: u64 },
}

impl TvError {
    /// Create a new unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Create a new invalid target error.
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(step: &'static str, timeout: Duration) -> Self {
        Self::Timeout {
            step,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether the error is caused by caller input rather than the device.
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, Self::UnknownCommand { .. })
    }
}
