//! Outbound commands.

use crate::constants::BUZZ_PAYLOAD;
use crate::relay::RelayId;
use std::fmt;

/// A command written to a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip the given relay on the relay board.
    Toggle(RelayId),

    /// Pulse the door buzzer.
    Buzz,
}

impl Command {
    /// Wire payload for this command.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Toggle(relay) => vec![relay.as_wire_byte()],
            Self::Buzz => BUZZ_PAYLOAD.to_vec(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle(relay) => write!(f, "toggle relay {relay}"),
            Self::Buzz => write!(f, "buzz"),
        }
    }
}
