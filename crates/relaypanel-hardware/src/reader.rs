//! Reader loop: one task per live connection.

use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use relaypanel_protocol::{RelayLineCodec, StatusLine};
use tokio::io::AsyncReadExt;
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, warn};

use crate::connection::{BoxedReader, Connection};
use crate::manager::DeviceManager;
use crate::types::DeviceName;

const READ_BUFFER_CAPACITY: usize = 512;

/// How a single read attempt ended.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Bytes were appended to the buffer.
    Data(usize),

    /// No data yet; the stream is still open.
    Idle,

    /// The stream is finished, cleanly or not.
    Closed(io::Error),
}

impl ReadOutcome {
    /// Classify a raw read result.
    ///
    /// `TimedOut`, `WouldBlock` and `Interrupted` mean "nothing yet". A
    /// zero-length read is end-of-stream, which is terminal.
    pub fn classify(result: io::Result<usize>) -> Self {
        match result {
            Ok(0) => Self::Closed(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of stream",
            )),
            Ok(n) => Self::Data(n),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Self::Idle
            }
            Err(e) => Self::Closed(e),
        }
    }
}

impl DeviceManager {
    pub(crate) fn spawn_reader(&self, name: DeviceName, connection: Arc<Connection>) -> bool {
        let Some(reader) = connection.take_reader() else {
            debug!(device = %name, "reader already running");
            return false;
        };

        tokio::spawn(self.clone().read_loop(name, connection, reader));
        true
    }

    async fn read_loop(self, name: DeviceName, connection: Arc<Connection>, mut reader: BoxedReader) {
        let mut codec = RelayLineCodec::new();
        let mut buffer = BytesMut::with_capacity(READ_BUFFER_CAPACITY);
        let shutdown = self.inner.shutdown.clone();

        debug!(device = %name, peer = %connection.peer(), "reader started");

        loop {
            let result = tokio::select! {
                result = reader.read_buf(&mut buffer) => result,
                () = connection.closed() => {
                    debug!(device = %name, "connection closed; reader stopped");
                    return;
                }
                () = shutdown.cancelled() => return,
            };

            match ReadOutcome::classify(result) {
                ReadOutcome::Data(_) => self.drain_lines(name, &mut codec, &mut buffer),
                ReadOutcome::Idle => tokio::time::sleep(self.inner.config.idle_retry).await,
                ReadOutcome::Closed(e) => {
                    self.flush_lines(name, &mut codec, &mut buffer);
                    if self.inner.registry.invalidate(name, &connection) {
                        error!(device = %name, error = %e, "device read error");
                        self.start_reconnect_if_needed(name);
                    } else {
                        debug!(device = %name, error = %e, "replaced connection ended");
                    }
                    return;
                }
            }
        }
    }

    fn drain_lines(&self, name: DeviceName, codec: &mut RelayLineCodec, buffer: &mut BytesMut) {
        loop {
            match codec.decode(buffer) {
                Ok(Some(line)) => self.handle_line(name, line),
                Ok(None) => return,
                Err(e) => warn!(device = %name, error = %e, "invalid line skipped"),
            }
        }
    }

    /// Decode whatever is left at end-of-stream, including an unterminated line.
    fn flush_lines(&self, name: DeviceName, codec: &mut RelayLineCodec, buffer: &mut BytesMut) {
        loop {
            match codec.decode_eof(buffer) {
                Ok(Some(line)) => self.handle_line(name, line),
                Ok(None) => return,
                Err(e) => warn!(device = %name, error = %e, "invalid line skipped"),
            }
        }
    }

    fn handle_line(&self, name: DeviceName, line: StatusLine) {
        match line {
            StatusLine::Heartbeat(_) => {}
            StatusLine::Relays(mask) if name == DeviceName::Relays => {
                self.inner.relays.apply_mask(mask);
                info!(device = %name, bitmask = %mask, "relay states updated");
            }
            StatusLine::Relays(mask) => {
                debug!(device = %name, bitmask = %mask, "relay status from non-relay device ignored");
            }
            StatusLine::Unrecognized(text) => {
                info!(device = %name, line = %text, "read");
            }
        }
    }
}
