//! Reconnect loop: at most one task per device name.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backoff::ReconnectBackoff;
use crate::dialer::Dialer;
use crate::error::HardwareError;
use crate::manager::DeviceManager;
use crate::types::DeviceName;

impl DeviceManager {
    /// Start a reconnect loop for `name` unless one is already running.
    ///
    /// Returns whether a new loop was spawned. Without an installed dialer
    /// nothing is started and the condition is logged.
    pub fn start_reconnect_if_needed(&self, name: DeviceName) -> bool {
        if self.inner.shutdown.is_cancelled() {
            return false;
        }

        let Some(dialer) = self.inner.registry.dialer(name) else {
            let e = HardwareError::NoDialer { device: name };
            error!(device = %name, error = %e, "cannot reconnect");
            return false;
        };

        let Some(cancel) = self.inner.registry.begin_reconnect(name, &self.inner.shutdown) else {
            debug!(device = %name, "reconnect already in progress");
            return false;
        };

        tokio::spawn(self.clone().reconnect_loop(name, dialer, cancel));
        true
    }

    async fn reconnect_loop(self, name: DeviceName, dialer: Dialer, cancel: CancellationToken) {
        let mut backoff = ReconnectBackoff::new(self.inner.config.backoff);

        loop {
            let attempt = backoff.attempts() + 1;
            warn!(device = %name, attempt, "attempting reconnect");

            let start = Instant::now();
            let result = tokio::select! {
                result = dialer.dial() => result,
                () = cancel.cancelled() => {
                    debug!(device = %name, "reconnect cancelled");
                    return;
                }
            };
            let dur = start.elapsed();

            match result {
                Ok(connection) => {
                    let connection = Arc::new(connection);
                    let peer = connection.peer().to_string();
                    if let Some(previous) = self
                        .inner
                        .registry
                        .set_device(name, Some(Arc::clone(&connection)))
                    {
                        previous.close();
                    }
                    self.inner.registry.end_reconnect(name);
                    info!(device = %name, attempt, dur = ?dur, peer = %peer, "device connected");

                    // A writer may have failed on it before the flag cleared
                    if connection.is_closed() {
                        self.start_reconnect_if_needed(name);
                    } else {
                        self.spawn_reader(name, connection);
                    }
                    return;
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    error!(
                        device = %name,
                        attempt,
                        error = %e,
                        retry_in = ?delay,
                        dur = ?dur,
                        "reconnect failed"
                    );

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = cancel.cancelled() => {
                            debug!(device = %name, "reconnect cancelled");
                            return;
                        }
                    }
                }
            }
        }
    }
}
