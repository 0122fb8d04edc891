//! Line protocol spoken by the relay board and door buzzer controllers.
//!
//! Inbound traffic is newline-terminated ASCII status lines (heartbeats and
//! relay bitmasks). Outbound traffic is a single ASCII digit per command with
//! no terminator.

pub mod codec;
pub mod command;
pub mod constants;
pub mod error;
pub mod line;
pub mod relay;

pub use codec::RelayLineCodec;
pub use command::Command;
pub use constants::RELAY_COUNT;
pub use error::{ProtocolError, Result};
pub use line::StatusLine;
pub use relay::{RelayId, RelayMask};
