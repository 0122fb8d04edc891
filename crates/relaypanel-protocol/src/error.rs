//! Error types for the relay line protocol.

use thiserror::Error;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while parsing or framing protocol data.
///
/// None of these are transport failures. A malformed status line is skipped by
/// the reader and the connection stays up.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Relay identifier is not a single ASCII digit in range.
    #[error("Invalid relay id: {id:?}")]
    InvalidRelayId { id: String },

    /// `RELAYS:` payload is not a hexadecimal byte.
    #[error("Invalid relay mask {value:?}: {reason}")]
    InvalidRelayMask { value: String, reason: String },

    /// Inbound line exceeded the configured maximum length.
    #[error("Line too long: {length} bytes (max {max_length})")]
    LineTooLong { length: usize, max_length: usize },

    /// I/O error surfaced through the codec.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a new invalid relay id error.
    pub fn invalid_relay_id(id: impl Into<String>) -> Self {
        Self::InvalidRelayId { id: id.into() }
    }

    /// Create a new invalid relay mask error.
    pub fn invalid_relay_mask(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRelayMask {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error leaves the stream usable.
    ///
    /// Only I/O errors are fatal for a connection.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_relay_id_error() {
        let error = ProtocolError::invalid_relay_id("9");
        assert!(matches!(error, ProtocolError::InvalidRelayId { .. }));
        assert_eq!(error.to_string(), "Invalid relay id: \"9\"");
    }

    #[test]
    fn test_invalid_relay_mask_error() {
        let error = ProtocolError::invalid_relay_mask("zz", "invalid digit found in string");
        assert_eq!(
            error.to_string(),
            "Invalid relay mask \"zz\": invalid digit found in string"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(ProtocolError::invalid_relay_id("0").is_recoverable());
        assert!(
            ProtocolError::LineTooLong {
                length: 300,
                max_length: 256
            }
            .is_recoverable()
        );

        let io = ProtocolError::from(std::io::Error::other("reset"));
        assert!(!io.is_recoverable());
    }
}
