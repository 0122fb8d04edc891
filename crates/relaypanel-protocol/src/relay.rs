//! Relay identifiers and bitmasks.

use crate::constants::{MAX_RELAY_ID, MIN_RELAY_ID, RELAY_COUNT};
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relay number, 1 through 8.
///
/// The wire form is the single ASCII digit written to the board to toggle the
/// relay, so parsing is deliberately strict: `"03"`, `" 3"` and `"+3"` are all
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelayId(u8);

impl RelayId {
    /// Create a relay id from its 1-based number.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidRelayId` if `number` is outside 1-8.
    pub fn new(number: u8) -> Result<Self> {
        if !(MIN_RELAY_ID..=MAX_RELAY_ID).contains(&number) {
            return Err(ProtocolError::invalid_relay_id(number.to_string()));
        }
        Ok(Self(number))
    }

    /// Parse the textual id used by the HTTP surface and the wire.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidRelayId` unless `id` is exactly one
    /// ASCII digit between `'1'` and `'8'`.
    pub fn parse(id: &str) -> Result<Self> {
        match id.as_bytes() {
            [digit @ b'1'..=b'8'] => Ok(Self(digit - b'0')),
            _ => Err(ProtocolError::invalid_relay_id(id)),
        }
    }

    /// Create a relay id from a 0-based table index.
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= RELAY_COUNT {
            return Err(ProtocolError::invalid_relay_id(index.to_string()));
        }
        Ok(Self(index as u8 + 1))
    }

    /// 1-based relay number.
    #[must_use]
    pub fn number(&self) -> u8 {
        self.0
    }

    /// 0-based index into the relay table.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }

    /// The ASCII digit sent on the wire.
    #[must_use]
    pub fn as_wire_byte(&self) -> u8 {
        b'0' + self.0
    }

    /// All relay ids in board order.
    pub fn all() -> impl Iterator<Item = RelayId> {
        (MIN_RELAY_ID..=MAX_RELAY_ID).map(RelayId)
    }
}

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RelayId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        RelayId::parse(s)
    }
}

/// Relay on/off bitmask as reported by the board.
///
/// Bit `i` carries the state of relay `i + 1`; a set bit means the relay is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RelayMask(u8);

impl RelayMask {
    /// Wrap a raw mask byte.
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits)
    }

    /// Parse the hexadecimal payload of a `RELAYS:` line.
    ///
    /// Surrounding whitespace and an optional `0x`/`0X` prefix are ignored.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidRelayMask` if the remainder is not a
    /// base-16 number fitting in one byte.
    pub fn parse_hex(payload: &str) -> Result<Self> {
        let trimmed = payload.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        // from_str_radix tolerates a leading '+', the board never sends one
        if digits.starts_with('+') {
            return Err(ProtocolError::invalid_relay_mask(digits, "unexpected sign"));
        }

        u8::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|e| ProtocolError::invalid_relay_mask(digits, e.to_string()))
    }

    /// Raw mask byte.
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the given relay is on.
    #[must_use]
    pub fn is_on(&self, relay: RelayId) -> bool {
        (self.0 >> relay.index()) & 1 == 1
    }

    /// Per-relay states in board order.
    #[must_use]
    pub fn states(&self) -> [bool; RELAY_COUNT] {
        std::array::from_fn(|i| (self.0 >> i) & 1 == 1)
    }

    /// Number of relays switched on.
    #[must_use]
    pub fn count_on(&self) -> u32 {
        self.0.count_ones()
    }
}

impl fmt::Display for RelayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case("3", 3)]
    #[case("8", 8)]
    fn test_parse_valid_ids(#[case] input: &str, #[case] expected: u8) {
        let id = RelayId::parse(input).unwrap();
        assert_eq!(id.number(), expected);
        assert_eq!(id.index(), usize::from(expected - 1));
    }

    #[rstest]
    #[case("0")]
    #[case("9")]
    #[case("12")]
    #[case("")]
    #[case("a")]
    #[case(" 3")]
    #[case("03")]
    fn test_parse_invalid_ids(#[case] input: &str) {
        let result = RelayId::parse(input);
        assert!(matches!(result, Err(ProtocolError::InvalidRelayId { .. })));
    }

    #[test]
    fn test_new_bounds() {
        assert!(RelayId::new(0).is_err());
        assert!(RelayId::new(1).is_ok());
        assert!(RelayId::new(8).is_ok());
        assert!(RelayId::new(9).is_err());
    }

    #[test]
    fn test_from_index() {
        assert_eq!(RelayId::from_index(0).unwrap().number(), 1);
        assert_eq!(RelayId::from_index(7).unwrap().number(), 8);
        assert!(RelayId::from_index(8).is_err());
    }

    #[test]
    fn test_wire_byte() {
        assert_eq!(RelayId::parse("3").unwrap().as_wire_byte(), b'3');
        assert_eq!(RelayId::new(8).unwrap().as_wire_byte(), b'8');
    }

    #[test]
    fn test_all_ids_in_order() {
        let numbers: Vec<u8> = RelayId::all().map(|id| id.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[rstest]
    #[case("05", 0x05)]
    #[case("0x05", 0x05)]
    #[case("0XfF", 0xFF)]
    #[case(" a0 ", 0xA0)]
    #[case("0", 0x00)]
    fn test_parse_hex_mask(#[case] payload: &str, #[case] expected: u8) {
        assert_eq!(RelayMask::parse_hex(payload).unwrap().bits(), expected);
    }

    #[rstest]
    #[case("zz")]
    #[case("")]
    #[case("0x")]
    #[case("100")]
    #[case("-1")]
    fn test_parse_hex_mask_rejects(#[case] payload: &str) {
        let result = RelayMask::parse_hex(payload);
        assert!(matches!(result, Err(ProtocolError::InvalidRelayMask { .. })));
    }

    #[test]
    fn test_mask_states() {
        let mask = RelayMask::new(0x05);
        assert_eq!(
            mask.states(),
            [true, false, true, false, false, false, false, false]
        );
        assert!(mask.is_on(RelayId::new(1).unwrap()));
        assert!(!mask.is_on(RelayId::new(2).unwrap()));
        assert_eq!(mask.count_on(), 2);
    }

    #[test]
    fn test_mask_display() {
        assert_eq!(RelayMask::new(0x05).to_string(), "00000101");
        assert_eq!(RelayMask::new(0xFF).to_string(), "11111111");
    }
}
