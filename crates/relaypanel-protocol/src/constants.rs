//! Wire constants for the relay board line protocol.
//!
//! The relay and buzzer controllers speak a minimal ASCII protocol:
//!
//! ```text
//! device -> host   HB:<seq>\n            heartbeat, ignored
//! device -> host   RELAYS:[0x]<hex>\n    relay bitmask, bit i = relay i+1
//! host -> device   '1'..'8'              toggle relay N
//! host -> device   '1'                   trigger the buzzer
//! ```
//!
//! There is no acknowledgement frame. A toggle is only observed through the
//! next `RELAYS:` status line.

/// Number of relays on the board.
pub const RELAY_COUNT: usize = 8;

/// Lowest valid relay number (inclusive).
pub const MIN_RELAY_ID: u8 = 1;

/// Highest valid relay number (inclusive).
pub const MAX_RELAY_ID: u8 = RELAY_COUNT as u8;

/// Prefix of periodic liveness lines.
pub const HEARTBEAT_PREFIX: &str = "HB:";

/// Prefix of relay bitmask status lines.
pub const RELAYS_PREFIX: &str = "RELAYS:";

/// Line terminator for inbound status lines.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Payload written to the buzzer controller.
pub const BUZZ_PAYLOAD: &[u8] = b"1";

/// Default maximum length of a single inbound line, excluding the terminator.
///
/// Status lines are a handful of bytes. Anything longer than this is noise on
/// the wire and gets discarded rather than buffered.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 256;
