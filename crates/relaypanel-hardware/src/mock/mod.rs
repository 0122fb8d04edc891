//! Scripted in-memory transport for testing without hardware.
//!
//! [`mock_connection`] returns a [`Connection`] and a [`MockDeviceHandle`]
//! that plays the device side: it queues read outcomes (data, idle, hard
//! error, end-of-stream) and records everything the host writes.
//!
//! ```
//! use relaypanel_hardware::mock::mock_connection;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (connection, device) = mock_connection("relays");
//!
//!     connection.write_all(b"3").await.unwrap();
//!     assert_eq!(device.written(), b"3".to_vec());
//!
//!     device.send_line("RELAYS:0x04");
//! }
//! ```

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::error::HardwareError;

/// One scripted read result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStep {
    /// Deliver bytes.
    Data(Vec<u8>),

    /// Return `TimedOut`, the "no data yet" signal of a keep-open stream.
    Idle,

    /// Return a hard error of the given kind.
    Fail(io::ErrorKind),

    /// Return a zero-length read.
    Eof,
}

/// Create a connected mock transport.
pub fn mock_connection(peer: &str) -> (Connection, MockDeviceHandle) {
    let (steps_tx, steps_rx) = mpsc::unbounded_channel();
    let written = Arc::new(Mutex::new(Vec::new()));
    let fail_writes = Arc::new(AtomicBool::new(false));

    let reader = MockReader {
        steps: steps_rx,
        pending: Vec::new(),
    };
    let writer = MockWriter {
        written: Arc::clone(&written),
        fail_writes: Arc::clone(&fail_writes),
    };

    let connection = Connection::new(peer, Box::new(reader), Box::new(writer));
    let handle = MockDeviceHandle {
        steps: steps_tx,
        written,
        fail_writes,
    };

    (connection, handle)
}

struct MockReader {
    steps: mpsc::UnboundedReceiver<ReadStep>,
    pending: Vec<u8>,
}

impl AsyncRead for MockReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.pending.is_empty() {
            match self.steps.poll_recv(cx) {
                Poll::Ready(Some(ReadStep::Data(data))) => self.pending = data,
                Poll::Ready(Some(ReadStep::Idle)) => {
                    return Poll::Ready(Err(io::ErrorKind::TimedOut.into()));
                }
                Poll::Ready(Some(ReadStep::Fail(kind))) => return Poll::Ready(Err(kind.into())),
                Poll::Ready(Some(ReadStep::Eof)) | Poll::Ready(None) => return Poll::Ready(Ok(())),
                Poll::Pending => return Poll::Pending,
            }
        }

        let n = self.pending.len().min(buf.remaining());
        buf.put_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Poll::Ready(Ok(()))
    }
}

struct MockWriter {
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl AsyncWrite for MockWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()));
        }
        self.written.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Device side of a mock connection. Cloneable.
///
/// Sends are silently dropped once the host side has gone away.
#[derive(Debug, Clone)]
pub struct MockDeviceHandle {
    steps: mpsc::UnboundedSender<ReadStep>,
    written: Arc<Mutex<Vec<u8>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockDeviceHandle {
    /// Queue a read outcome.
    pub fn push(&self, step: ReadStep) {
        let _ = self.steps.send(step);
    }

    /// Queue a `\n`-terminated line.
    pub fn send_line(&self, line: &str) {
        self.push(ReadStep::Data(format!("{line}\n").into_bytes()));
    }

    /// Queue raw bytes.
    pub fn send_bytes(&self, bytes: &[u8]) {
        self.push(ReadStep::Data(bytes.to_vec()));
    }

    /// Queue a "no data yet" read.
    pub fn send_idle(&self) {
        self.push(ReadStep::Idle);
    }

    /// Queue a hard read error.
    pub fn fail_read(&self, kind: io::ErrorKind) {
        self.push(ReadStep::Fail(kind));
    }

    /// Queue end-of-stream.
    pub fn hang_up(&self) {
        self.push(ReadStep::Eof);
    }

    /// Make subsequent writes fail with `BrokenPipe`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Everything written by the host so far.
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().clone()
    }

    /// Whether the host side has dropped its reader.
    pub fn is_reader_dropped(&self) -> bool {
        self.steps.is_closed()
    }
}

#[derive(Debug, Default)]
struct DialerState {
    failing: bool,
    attempts: Vec<Instant>,
    devices: Vec<MockDeviceHandle>,
}

/// Dialer producing mock connections, with attempt recording.
#[derive(Debug, Clone, Default)]
pub struct MockDialer {
    state: Arc<Mutex<DialerState>>,
}

impl MockDialer {
    /// Dialer whose attempts succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dialer whose attempts fail until told otherwise.
    pub fn failing() -> Self {
        let dialer = Self::default();
        dialer.set_failing(true);
        dialer
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Number of dial attempts so far.
    pub fn attempts(&self) -> usize {
        self.state.lock().attempts.len()
    }

    /// When each attempt happened (tokio clock, so paused time works).
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.state.lock().attempts.clone()
    }

    /// Device handle of the most recent successful dial.
    pub fn last_device(&self) -> Option<MockDeviceHandle> {
        self.state.lock().devices.last().cloned()
    }

    /// Wrap as a [`Dialer`].
    pub fn dialer(&self) -> Dialer {
        let mock = self.clone();
        Dialer::new(move || {
            let result = mock.attempt();
            async move { result }
        })
    }

    fn attempt(&self) -> crate::Result<Connection> {
        let mut state = self.state.lock();
        state.attempts.push(Instant::now());
        if state.failing {
            return Err(HardwareError::dial_failed("mock", "connection refused"));
        }

        let (connection, device) = mock_connection("mock");
        state.devices.push(device);
        Ok(connection)
    }
}
