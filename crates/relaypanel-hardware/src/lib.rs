//! Connection management for the relay board and door buzzer.
//!
//! This crate owns the live byte-stream connections to the controllers,
//! decodes their status lines into relay state, and recovers from connection
//! loss on its own.
//!
//! # Overview
//!
//! - [`DeviceManager`]: the entry point. Holds one connection slot per
//!   [`DeviceName`], the [`RelayTable`](relay_table::RelayTable), and spawns
//!   reader and reconnect tasks.
//! - [`Dialer`]: how a device is (re)connected. Built from a closure, or from
//!   the [`transport`] module for telnet and serial ports.
//! - [`Connection`]: a duplex stream with a close flag.
//!
//! # Failure model
//!
//! A read or write failure closes the connection, clears its slot and starts
//! a reconnect loop with exponential backoff (1s doubling to 30s, unbounded
//! attempts). Only a command whose own write failed reports the failure to its
//! caller. Malformed status lines are logged and skipped.
//!
//! # Testing
//!
//! The [`mock`] module provides a scripted transport and a recording dialer:
//!
//! ```
//! use relaypanel_hardware::mock::mock_connection;
//! use relaypanel_hardware::{DeviceManager, DeviceName, ManagerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = DeviceManager::new(ManagerConfig::default());
//!     let (connection, device) = mock_connection("relays");
//!     manager.set_device(DeviceName::Relays, Some(connection));
//!
//!     manager.toggle_relay("3").await.unwrap();
//!     assert_eq!(device.written(), b"3".to_vec());
//! }
//! ```

pub mod backoff;
pub mod connection;
pub mod dialer;
pub mod error;
pub mod manager;
pub mod mock;
pub mod reader;
mod reconnect;
pub mod registry;
pub mod relay_table;
pub mod transport;
pub mod types;

pub use backoff::{BackoffConfig, ReconnectBackoff};
pub use connection::Connection;
pub use dialer::Dialer;
pub use error::{HardwareError, Result};
pub use manager::{DeviceManager, ManagerConfig};
pub use reader::ReadOutcome;
pub use types::{ConnectionStatus, DeviceName, DeviceState, RelayState};
