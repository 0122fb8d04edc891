//! Per-device connection slots.
//!
//! Two independent lock domains:
//!
//! - `devices`: the live connection per device, behind a read/write lock.
//! - `control`: dialers and in-flight reconnect tokens, behind a mutex.
//!
//! No method holds both at once, so a slow path on one side (a dial running
//! under reconnect bookkeeping, a writer snapshotting its connection) never
//! blocks the other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::connection::Connection;
use crate::dialer::Dialer;
use crate::types::DeviceName;

#[derive(Default)]
struct Control {
    dialers: HashMap<DeviceName, Dialer>,
    reconnecting: HashMap<DeviceName, CancellationToken>,
}

/// Holder of live connections, dialers and reconnect bookkeeping.
#[derive(Default)]
pub struct ConnectionRegistry {
    devices: RwLock<HashMap<DeviceName, Arc<Connection>>>,
    control: Mutex<Control>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the dialer for a device.
    pub fn set_dialer(&self, name: DeviceName, dialer: Dialer) {
        self.control.lock().dialers.insert(name, dialer);
    }

    pub fn dialer(&self, name: DeviceName) -> Option<Dialer> {
        self.control.lock().dialers.get(&name).cloned()
    }

    /// Replace the connection for a device, returning the previous one.
    ///
    /// The previous connection is not closed; that is the caller's call.
    pub fn set_device(
        &self,
        name: DeviceName,
        connection: Option<Arc<Connection>>,
    ) -> Option<Arc<Connection>> {
        let mut devices = self.devices.write();
        match connection {
            Some(connection) => devices.insert(name, connection),
            None => devices.remove(&name),
        }
    }

    /// Snapshot of the current connection.
    pub fn get_device(&self, name: DeviceName) -> Option<Arc<Connection>> {
        self.devices.read().get(&name).cloned()
    }

    /// Close a failed connection and clear its slot.
    ///
    /// Both happen under the write lock. The slot is only cleared if it still
    /// holds this connection; a newer one installed meanwhile is left alone.
    /// Returns whether the slot was cleared.
    pub fn invalidate(&self, name: DeviceName, failed: &Connection) -> bool {
        let mut devices = self.devices.write();
        failed.close();

        let current = devices.get(&name).is_some_and(|c| c.id() == failed.id());
        if current {
            devices.remove(&name);
        }
        current
    }

    /// Close and remove every connection.
    pub fn close_all(&self) -> Vec<(DeviceName, Arc<Connection>)> {
        let mut devices = self.devices.write();
        let drained: Vec<_> = devices.drain().collect();
        for (_, connection) in &drained {
            connection.close();
        }
        drained
    }

    /// Mark a reconnect loop active for `name`.
    ///
    /// Returns a token for the new loop, or `None` if one is already active.
    pub fn begin_reconnect(
        &self,
        name: DeviceName,
        parent: &CancellationToken,
    ) -> Option<CancellationToken> {
        let mut control = self.control.lock();
        if control.reconnecting.contains_key(&name) {
            return None;
        }
        let token = parent.child_token();
        control.reconnecting.insert(name, token.clone());
        Some(token)
    }

    /// Clear the reconnect flag for `name`.
    pub fn end_reconnect(&self, name: DeviceName) {
        self.control.lock().reconnecting.remove(&name);
    }

    pub fn is_reconnecting(&self, name: DeviceName) -> bool {
        self.control.lock().reconnecting.contains_key(&name)
    }

    /// Cancel every active reconnect loop.
    pub fn cancel_reconnects(&self) {
        let mut control = self.control.lock();
        for (_, token) in control.reconnecting.drain() {
            token.cancel();
        }
    }
}
