//! Tokio codec for the relay line protocol.
//!
//! [`RelayLineCodec`] splits an inbound byte stream on `\n`, classifies each
//! line as a [`StatusLine`] and encodes outbound [`Command`]s.
//!
//! # Error model
//!
//! Decode errors are protocol errors, not stream failures: the offending line
//! has already been consumed from the buffer when the error is returned, so the
//! caller can log it and call `decode` again on the same buffer.
//!
//! Overlong lines (no terminator within `max_length` bytes) are reported once
//! with [`ProtocolError::LineTooLong`] and then discarded up to and including
//! the next terminator.
//!
//! # Usage
//!
//! ```
//! use bytes::BytesMut;
//! use tokio_util::codec::Decoder;
//! use relaypanel_protocol::{RelayLineCodec, RelayMask, StatusLine};
//!
//! let mut codec = RelayLineCodec::new();
//! let mut buffer = BytesMut::from(&b"HB:01\nRELAYS:0x05\nRELA"[..]);
//!
//! assert!(codec.decode(&mut buffer).unwrap().unwrap().is_heartbeat());
//! assert_eq!(
//!     codec.decode(&mut buffer).unwrap(),
//!     Some(StatusLine::Relays(RelayMask::new(0x05)))
//! );
//! // Partial line stays buffered until the rest arrives
//! assert_eq!(codec.decode(&mut buffer).unwrap(), None);
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::constants::{DEFAULT_MAX_LINE_LENGTH, LINE_TERMINATOR};
use crate::error::{ProtocolError, Result};
use crate::line::StatusLine;

/// Line codec for relay and buzzer controllers.
#[derive(Debug, Clone)]
pub struct RelayLineCodec {
    /// Index in the buffer up to which the terminator has already been
    /// searched for.
    next_index: usize,

    /// Maximum line length, excluding the terminator.
    max_length: usize,

    /// Set after an overlong line was reported; bytes are dropped until the
    /// next terminator.
    discarding: bool,
}

impl RelayLineCodec {
    /// Create a codec with the default maximum line length.
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            next_index: 0,
            max_length,
            discarding: false,
        }
    }

    /// Get the configured maximum line length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn parse_line(line: &[u8]) -> Result<StatusLine> {
        // Firmware output is ASCII; lossy decoding keeps a stray byte from
        // turning into a hard failure.
        let text = String::from_utf8_lossy(line);
        StatusLine::parse(&text)
    }
}

impl Default for RelayLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RelayLineCodec {
    type Item = StatusLine;
    type Error = ProtocolError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<StatusLine>> {
        loop {
            let read_to = self.max_length.saturating_add(1).min(buf.len());
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|b| *b == LINE_TERMINATOR);

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    buf.advance(self.next_index + offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let terminator = self.next_index + offset;
                    self.next_index = 0;
                    let line = buf.split_to(terminator + 1);
                    return Self::parse_line(&line[..terminator]).map(Some);
                }
                (false, None) if buf.len() > self.max_length => {
                    self.discarding = true;
                    return Err(ProtocolError::LineTooLong {
                        length: buf.len(),
                        max_length: self.max_length,
                    });
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<StatusLine>> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        // Final unterminated line
        if buf.is_empty() || self.discarding {
            buf.clear();
            return Ok(None);
        }

        self.next_index = 0;
        let line = buf.split_to(buf.len());
        Self::parse_line(&line).map(Some)
    }
}

impl Encoder<Command> for RelayLineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}
