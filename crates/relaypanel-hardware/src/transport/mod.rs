//! Concrete transports producing [`Connection`](crate::Connection)s.
//!
//! Each transport exposes a `dialer` constructor. Transports map their own
//! "no data yet" conditions onto idle read outcomes (or absorb them entirely),
//! so the reader loop can treat a zero-length read as end-of-stream.

#[cfg(feature = "serial")]
pub mod serial;
pub mod telnet;

#[cfg(feature = "serial")]
pub use serial::SerialConfig;
pub use telnet::TelnetTarget;
