//! Raw TCP ("telnet") transport to ESP32 controllers.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::net::{TcpStream, ToSocketAddrs, lookup_host};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::error::{HardwareError, Result};

/// Port used when the address has none.
pub const DEFAULT_TELNET_PORT: u16 = 23;

/// Connect timeout for each dial attempt.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// A `host[:port]` telnet target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelnetTarget {
    host: String,
    port: u16,
}

impl TelnetTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host` or `host:port`.
    ///
    /// # Errors
    /// Returns `HardwareError::InvalidAddress` for an empty host or a port that
    /// is not a number.
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| HardwareError::invalid_address(address, e.to_string()))?;
                (host, port)
            }
            _ => (address, DEFAULT_TELNET_PORT),
        };

        if host.is_empty() {
            return Err(HardwareError::invalid_address(address, "empty host"));
        }

        Ok(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for TelnetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Connect to a telnet target.
///
/// Dials the name directly first. If that fails, the host is resolved and
/// every address is tried in turn; the last error wins when all fail.
pub async fn connect(target: &TelnetTarget, dial_timeout: Duration) -> Result<Connection> {
    let address = target.to_string();
    info!(peer = %address, "telnet dialing");

    let start = Instant::now();
    let primary_err = match connect_with_timeout(address.as_str(), &address, dial_timeout).await {
        Ok(stream) => {
            info!(peer = %address, dur = ?start.elapsed(), "telnet connected");
            return Ok(Connection::from_stream(address, stream));
        }
        Err(e) => e,
    };

    warn!(peer = %address, error = %primary_err, "telnet primary dial failed; attempting DNS fallbacks");

    let resolved: Vec<_> = match lookup_host(address.as_str()).await {
        Ok(addrs) => addrs.collect(),
        Err(_) => return Err(primary_err),
    };
    info!(host = %target.host, ips = ?resolved, "telnet resolved host");

    let mut last_err = primary_err;
    for (index, addr) in resolved.into_iter().enumerate() {
        let label = addr.to_string();
        info!(addr = %label, index, "telnet dialing resolved IP");

        let start = Instant::now();
        match connect_with_timeout(addr, &label, dial_timeout).await {
            Ok(stream) => {
                info!(addr = %label, dur = ?start.elapsed(), "telnet connected (resolved IP)");
                return Ok(Connection::from_stream(address, stream));
            }
            Err(e) => {
                warn!(addr = %label, error = %e, dur = ?start.elapsed(), "telnet dial to resolved IP failed");
                last_err = e;
            }
        }
    }

    Err(last_err)
}

/// Dialer that connects to `target` on every attempt.
pub fn dialer(target: TelnetTarget, dial_timeout: Duration) -> Dialer {
    Dialer::new(move || {
        let target = target.clone();
        async move { connect(&target, dial_timeout).await }
    })
}

async fn connect_with_timeout<A: ToSocketAddrs>(
    addr: A,
    label: &str,
    dial_timeout: Duration,
) -> Result<TcpStream> {
    let stream = match timeout(dial_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(HardwareError::dial_failed(label, e)),
        Err(_) => return Err(HardwareError::dial_timeout(label, dial_timeout)),
    };

    // Commands are single bytes
    stream.set_nodelay(true)?;
    Ok(stream)
}
