//! Device connection manager.
//!
//! [`DeviceManager`] is the single owner of controller connections. It is
//! cheap to clone and is shared between the HTTP layer and its own background
//! tasks:
//!
//! ```text
//!                  ┌──────────────────────┐
//!  HTTP handlers ─►│ toggle_relay / buzz  │──write──► Connection
//!                  │                      │
//!                  │  ConnectionRegistry  │◄──set──── Reconnect loop
//!                  │  RelayTable          │               ▲
//!                  └──────────────────────┘               │ read/write failure
//!                             ▲                           │
//!                             └──apply mask── Reader loop ┘
//! ```
//!
//! One reader loop runs per live connection and at most one reconnect loop
//! per device. Both are ordinary tokio tasks holding a clone of the manager.
//!
//! # Examples
//!
//! ```no_run
//! use relaypanel_hardware::transport::telnet::{self, TelnetTarget, DEFAULT_DIAL_TIMEOUT};
//! use relaypanel_hardware::{DeviceManager, DeviceName, ManagerConfig};
//!
//! # async fn example() -> relaypanel_hardware::Result<()> {
//! let manager = DeviceManager::new(ManagerConfig::default());
//!
//! let target = TelnetTarget::parse("esp32-1.local")?;
//! manager.set_dialer(DeviceName::Relays, telnet::dialer(target.clone(), DEFAULT_DIAL_TIMEOUT));
//!
//! let connection = telnet::connect(&target, DEFAULT_DIAL_TIMEOUT).await?;
//! manager.set_device(DeviceName::Relays, Some(connection));
//! manager.start_reader(DeviceName::Relays);
//!
//! manager.toggle_relay("3").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use relaypanel_protocol::{Command, RELAY_COUNT, RelayId, RelayLineCodec};
use tokio_util::codec::Encoder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::BackoffConfig;
use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::error::{HardwareError, Result};
use crate::registry::ConnectionRegistry;
use crate::relay_table::RelayTable;
use crate::types::{ConnectionStatus, DeviceName, DeviceState, RelayState};

/// Timing configuration for the manager's background loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Pause before retrying a read that returned no data yet.
    pub idle_retry: Duration,

    /// Reconnect backoff limits.
    pub backoff: BackoffConfig,
}

impl ManagerConfig {
    pub fn with_idle_retry(mut self, idle_retry: Duration) -> Self {
        self.idle_retry = idle_retry;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            idle_retry: Duration::from_millis(200),
            backoff: BackoffConfig::default(),
        }
    }
}

pub(crate) struct Inner {
    pub(crate) registry: ConnectionRegistry,
    pub(crate) relays: RelayTable,
    pub(crate) config: ManagerConfig,
    pub(crate) shutdown: CancellationToken,
}

/// Owner of controller connections, relay state and recovery tasks.
#[derive(Clone)]
pub struct DeviceManager {
    pub(crate) inner: Arc<Inner>,
}

impl DeviceManager {
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: ConnectionRegistry::new(),
                relays: RelayTable::new(),
                config,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.inner.config
    }

    /// Install or replace the dialer used to reconnect `name`.
    pub fn set_dialer(&self, name: DeviceName, dialer: Dialer) {
        self.inner.registry.set_dialer(name, dialer);
    }

    /// Replace the connection for `name`, returning the previous one unclosed.
    pub fn set_device(
        &self,
        name: DeviceName,
        connection: Option<Connection>,
    ) -> Option<Arc<Connection>> {
        self.inner.registry.set_device(name, connection.map(Arc::new))
    }

    pub fn get_device(&self, name: DeviceName) -> Option<Arc<Connection>> {
        self.inner.registry.get_device(name)
    }

    pub fn device_connected(&self, name: DeviceName) -> bool {
        self.get_device(name).is_some()
    }

    /// Connectivity of every known device.
    pub fn device_states(&self) -> Vec<DeviceState> {
        DeviceName::ALL
            .into_iter()
            .map(|name| DeviceState {
                name,
                state: ConnectionStatus::from_connected(self.device_connected(name)),
            })
            .collect()
    }

    /// Spawn a reader loop for the current connection of `name`.
    ///
    /// No-op (returns `false`) when there is no connection or its reader is
    /// already running.
    pub fn start_reader(&self, name: DeviceName) -> bool {
        match self.get_device(name) {
            Some(connection) => self.spawn_reader(name, connection),
            None => {
                debug!(device = %name, "no connection; reader not started");
                false
            }
        }
    }

    /// Whether a reconnect loop is active for `name`.
    pub fn is_reconnecting(&self, name: DeviceName) -> bool {
        self.inner.registry.is_reconnecting(name)
    }

    /// Snapshot of all relays in board order.
    pub fn relay_states(&self) -> Vec<RelayState> {
        self.inner.relays.snapshot()
    }

    /// Replace all relay labels.
    pub fn set_labels(&self, labels: [String; RELAY_COUNT]) {
        self.inner.relays.set_labels(labels);
    }

    /// Replace one relay label by 0-based index.
    pub fn update_label(&self, index: usize, label: impl Into<String>) -> Result<()> {
        self.inner.relays.update_label(index, label)
    }

    /// Toggle relay `id` (`"1"`..`"8"`).
    ///
    /// The relay table is not touched; the board confirms the change with its
    /// next status line.
    ///
    /// # Errors
    /// - `InvalidRelayId` for anything but a single digit 1-8; nothing is written.
    /// - `NotConnected` when the relay board has no live connection.
    /// - `WriteFailed` when the write fails; reconnection is already scheduled.
    pub async fn toggle_relay(&self, id: &str) -> Result<()> {
        let relay = RelayId::parse(id).map_err(|_| HardwareError::InvalidRelayId {
            id: id.to_string(),
        })?;
        self.send_command(DeviceName::Relays, Command::Toggle(relay))
            .await
    }

    /// Pulse the door buzzer.
    ///
    /// # Errors
    /// Same contract as [`toggle_relay`](Self::toggle_relay) against the buzzer.
    pub async fn buzz_door(&self) -> Result<()> {
        self.send_command(DeviceName::Buzzer, Command::Buzz).await
    }

    async fn send_command(&self, name: DeviceName, command: Command) -> Result<()> {
        let connection = self
            .get_device(name)
            .ok_or(HardwareError::not_connected(name))?;

        let mut payload = BytesMut::new();
        RelayLineCodec::new().encode(command, &mut payload)?;

        if let Err(e) = connection.write_all(&payload).await {
            // A stale handle must not disturb the connection that replaced it
            if self.inner.registry.invalidate(name, &connection) {
                warn!(device = %name, error = %e, "device write failed; scheduling reconnect");
                self.start_reconnect_if_needed(name);
            } else {
                debug!(device = %name, error = %e, "write failed on a replaced connection");
            }
            return Err(HardwareError::write_failed(name, e));
        }

        debug!(device = %name, %command, "command sent");
        Ok(())
    }

    /// Stop background loops and close every connection.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.registry.cancel_reconnects();
        for (name, connection) in self.inner.registry.close_all() {
            info!(device = %name, peer = %connection.peer(), "closed device");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl std::fmt::Debug for DeviceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("config", &self.inner.config)
            .field("devices", &self.device_states())
            .finish_non_exhaustive()
    }
}
