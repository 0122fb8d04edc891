//! Serial port transport.
//!
//! `serialport` is blocking, so each open port gets a small bridge: a std
//! thread pumps port reads into an in-memory duplex pipe and an async task
//! drains the pipe into port writes on the blocking pool. The manager only
//! ever sees the async end of the pipe.
//!
//! Port read timeouts are absorbed by the bridge and never reach the reader
//! loop. Any other port failure shuts the pipe down, which the reader loop
//! observes as end-of-stream.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::error::{HardwareError, Result};

/// Serial port used when none is given.
pub const DEFAULT_SERIAL_PORT: &str = "COM5";

/// Baud rate of the Arduino UNO relay firmware.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Port read timeout; bounds how long the bridge takes to notice a close.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

const BRIDGE_BUFFER: usize = 1024;

/// Serial port settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERIAL_PORT, DEFAULT_BAUD_RATE)
    }
}

/// Open the port (8N1, no flow control) and bridge it to an async connection.
pub async fn open(config: &SerialConfig) -> Result<Connection> {
    info!(port = %config.port, baud = config.baud_rate, "opening serial port");

    let settings = config.clone();
    let port = tokio::task::spawn_blocking(move || {
        serialport::new(&settings.port, settings.baud_rate)
            .timeout(settings.read_timeout)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .open()
    })
    .await
    .map_err(io::Error::other)?
    .map_err(|e| HardwareError::dial_failed(format!("{}@{}", config.port, config.baud_rate), e))?;

    bridge(&config.port, port)
}

/// Dialer that reopens the port on every attempt.
pub fn dialer(config: SerialConfig) -> Dialer {
    Dialer::new(move || {
        let config = config.clone();
        async move { open(&config).await }
    })
}

fn bridge(name: &str, port: Box<dyn SerialPort>) -> Result<Connection> {
    let (local, remote) = tokio::io::duplex(BRIDGE_BUFFER);
    let connection = Connection::from_stream(name, local);
    let stop = connection.close_token();

    let (remote_rx, remote_tx) = tokio::io::split(remote);
    let inbound_port = port.try_clone()?;
    let handle = Handle::current();

    let inbound_stop = stop.clone();
    let port_name = name.to_string();
    std::thread::Builder::new()
        .name(format!("serial-rx-{name}"))
        .spawn(move || pump_inbound(&port_name, inbound_port, remote_tx, inbound_stop, handle))?;

    tokio::spawn(pump_outbound(name.to_string(), port, remote_rx, stop));

    Ok(connection)
}

fn pump_inbound(
    name: &str,
    mut port: Box<dyn SerialPort>,
    mut pipe: WriteHalf<DuplexStream>,
    stop: CancellationToken,
    handle: Handle,
) {
    let mut buf = [0u8; 256];

    while !stop.is_cancelled() {
        match port.read(&mut buf) {
            Ok(0) => continue,
            Ok(n) => {
                let delivered = handle.block_on(async {
                    tokio::select! {
                        result = pipe.write_all(&buf[..n]) => result.is_ok(),
                        () = stop.cancelled() => false,
                    }
                });
                if !delivered {
                    break;
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {
                continue;
            }
            Err(e) => {
                warn!(port = %name, error = %e, "serial read failed");
                break;
            }
        }
    }

    debug!(port = %name, "serial inbound bridge stopped");
    stop.cancel();
    let _ = handle.block_on(pipe.shutdown());
}

async fn pump_outbound(
    name: String,
    mut port: Box<dyn SerialPort>,
    mut pipe: ReadHalf<DuplexStream>,
    stop: CancellationToken,
) {
    let mut buf = [0u8; 64];

    loop {
        let n = tokio::select! {
            result = pipe.read(&mut buf) => match result {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            },
            () = stop.cancelled() => break,
        };

        let data = buf[..n].to_vec();
        let written = tokio::task::spawn_blocking(move || {
            let result = port.write_all(&data).and_then(|()| port.flush());
            (port, result)
        })
        .await;

        match written {
            Ok((returned, Ok(()))) => port = returned,
            Ok((_, Err(e))) => {
                warn!(port = %name, error = %e, "serial write failed");
                break;
            }
            Err(e) => {
                warn!(port = %name, error = %e, "serial write task failed");
                break;
            }
        }
    }

    debug!(port = %name, "serial outbound bridge stopped");
    stop.cancel();
}
