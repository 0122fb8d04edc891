//! Initial device connections.

use futures::future::try_join_all;
use relaypanel_hardware::transport::{serial, telnet};
use relaypanel_hardware::{DeviceManager, DeviceName, Dialer, Result};
use relaypanel_storage::{LabelStore, StorageResult, labels_by_position};
use tracing::info;

use crate::config::DeviceMode;

/// Dialers for every device the mode drives.
pub fn dialers_for(mode: &DeviceMode) -> Vec<(DeviceName, Dialer)> {
    match mode {
        DeviceMode::Serial(config) => {
            vec![(DeviceName::Relays, serial::dialer(config.clone()))]
        }
        DeviceMode::Telnet(target) => vec![(
            DeviceName::Relays,
            telnet::dialer(target.clone(), telnet::DEFAULT_DIAL_TIMEOUT),
        )],
        DeviceMode::Multi { relays, buzzer } => vec![
            (
                DeviceName::Relays,
                telnet::dialer(relays.clone(), telnet::DEFAULT_DIAL_TIMEOUT),
            ),
            (
                DeviceName::Buzzer,
                telnet::dialer(buzzer.clone(), telnet::DEFAULT_DIAL_TIMEOUT),
            ),
        ],
    }
}

/// Install dialers and make the first connection to every device.
///
/// All devices are dialled concurrently. If any dial fails the others are
/// dropped and nothing is installed, so startup fails as a whole. Dialers stay
/// registered either way.
pub async fn connect_devices(
    manager: &DeviceManager,
    dialers: Vec<(DeviceName, Dialer)>,
) -> Result<()> {
    for (name, dialer) in &dialers {
        manager.set_dialer(*name, dialer.clone());
        info!(device = %name, "dialing");
    }

    let connections = try_join_all(dialers.iter().map(|(name, dialer)| async move {
        dialer.dial().await.map(|connection| (*name, connection))
    }))
    .await?;

    for (name, connection) in connections {
        info!(device = %name, peer = %connection.peer(), "connected");
        if let Some(previous) = manager.set_device(name, Some(connection)) {
            previous.close();
        }
        manager.start_reader(name);
    }
    Ok(())
}

/// Seed the relay table from stored labels.
pub async fn load_labels<S: LabelStore>(manager: &DeviceManager, store: &S) -> StorageResult<()> {
    let rows = store.list().await?;
    manager.set_labels(labels_by_position(&rows));
    info!(count = rows.len(), "loaded relay labels");
    Ok(())
}
