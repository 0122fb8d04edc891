//! Periodic status report.

use std::time::Duration;

use relaypanel_hardware::{DeviceManager, DeviceState, RelayState};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// How often the status line is logged.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(15);

/// Render relay states as `Relay 1 (lamp) ON | Relay 2: OFF | ...`.
///
/// Returns the summary and the number of relays switched on.
pub fn format_relay_status(states: &[RelayState]) -> (String, usize) {
    let parts: Vec<String> = states
        .iter()
        .enumerate()
        .map(|(i, state)| {
            let on_off = if state.on { "ON" } else { "OFF" };
            if state.label.is_empty() {
                format!("Relay {}: {on_off}", i + 1)
            } else {
                format!("Relay {} ({}) {on_off}", i + 1, state.label)
            }
        })
        .collect();
    let on_count = states.iter().filter(|state| state.on).count();
    (parts.join(" | "), on_count)
}

/// Render device connectivity as `relays 🟢 | buzzer 🔴`.
pub fn format_device_status(devices: &[DeviceState]) -> String {
    devices
        .iter()
        .map(|device| {
            let dot = if device.state.is_connected() { "🟢" } else { "🔴" };
            format!("{} {dot}", device.name)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Log one status line.
pub fn log_status(manager: &DeviceManager) {
    let states = manager.relay_states();
    let (relays, on_count) = format_relay_status(&states);
    info!(
        devices = %format_device_status(&manager.device_states()),
        relays = %relays,
        relay_count = states.len(),
        on_count,
        "status"
    );
}

/// Log the status every `period` until `shutdown` fires.
pub fn spawn_status_reporter(
    manager: DeviceManager,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => log_status(&manager),
            }
        }
    })
}
