//! Classification of inbound status lines.

use crate::constants::{HEARTBEAT_PREFIX, RELAYS_PREFIX};
use crate::error::Result;
use crate::relay::RelayMask;

/// A decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// Periodic liveness ping. The payload is a sequence counter in practice
    /// but is never interpreted.
    Heartbeat(String),

    /// Full relay state report.
    Relays(RelayMask),

    /// Anything else the board prints (boot banners, debug output).
    Unrecognized(String),
}

impl StatusLine {
    /// Classify a single line.
    ///
    /// Surrounding whitespace (including the `\r` some firmwares emit) is
    /// stripped first. Unknown lines are not an error.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidRelayMask` for a `RELAYS:` line whose
    /// payload is not a hex byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use relaypanel_protocol::{RelayMask, StatusLine};
    ///
    /// let line = StatusLine::parse("RELAYS:0x05\r\n").unwrap();
    /// assert_eq!(line, StatusLine::Relays(RelayMask::new(0x05)));
    ///
    /// assert!(StatusLine::parse("HB:1F").unwrap().is_heartbeat());
    /// assert!(StatusLine::parse("RELAYS:zz").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();

        if let Some(payload) = line.strip_prefix(HEARTBEAT_PREFIX) {
            return Ok(Self::Heartbeat(payload.to_string()));
        }

        if let Some(payload) = line.strip_prefix(RELAYS_PREFIX) {
            return RelayMask::parse_hex(payload).map(Self::Relays);
        }

        Ok(Self::Unrecognized(line.to_string()))
    }

    /// Whether this is a heartbeat line.
    #[must_use]
    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Heartbeat(_))
    }
}
