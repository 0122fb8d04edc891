//! Duplex byte-stream connection to a controller.
//!
//! A [`Connection`] wraps any async read/write pair. The read half is handed
//! to exactly one reader loop; the write half is shared behind an async mutex
//! so HTTP-triggered commands never interleave on the wire.
//!
//! Closing is a flag, not a syscall: [`Connection::close`] cancels the
//! connection's token, which stops the reader loop and fails further writes.
//! The underlying stream is released when the last handle is dropped.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Boxed read half of a transport.
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half of a transport.
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A live connection to a relay or buzzer controller.
pub struct Connection {
    id: u64,
    peer: String,
    reader: parking_lot::Mutex<Option<BoxedReader>>,
    writer: tokio::sync::Mutex<BoxedWriter>,
    closed: CancellationToken,
}

impl Connection {
    /// Create a connection from separate read and write halves.
    pub fn new(peer: impl Into<String>, reader: BoxedReader, writer: BoxedWriter) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            peer: peer.into(),
            reader: parking_lot::Mutex::new(Some(reader)),
            writer: tokio::sync::Mutex::new(writer),
            closed: CancellationToken::new(),
        }
    }

    /// Create a connection from a single duplex stream.
    pub fn from_stream<S>(peer: impl Into<String>, stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self::new(peer, Box::new(reader), Box::new(writer))
    }

    /// Process-unique id, used to tell a replaced connection from its successor.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable peer (address or port name).
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Take the read half. Returns `None` once a reader loop owns it.
    pub(crate) fn take_reader(&self) -> Option<BoxedReader> {
        self.reader.lock().take()
    }

    /// Write a payload and flush it.
    ///
    /// Fails with `NotConnected` if the connection was closed before or
    /// during the write.
    pub async fn write_all(&self, payload: &[u8]) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error());
        }

        let mut writer = self.writer.lock().await;
        tokio::select! {
            result = async {
                writer.write_all(payload).await?;
                writer.flush().await
            } => result,
            () = self.closed.cancelled() => Err(closed_error()),
        }
    }

    /// Mark the connection closed. Idempotent.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once the connection is closed.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Token cancelled together with this connection.
    ///
    /// Transport adapters use it to stop their own background pumps.
    pub fn close_token(&self) -> CancellationToken {
        self.closed.child_token()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection closed")
}
