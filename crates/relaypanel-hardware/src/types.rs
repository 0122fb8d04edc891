//! Shared types for devices and relay state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical name of a controlled peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceName {
    /// The 8-channel relay board.
    Relays,

    /// The door buzzer controller.
    Buzzer,
}

impl DeviceName {
    /// All known devices in reporting order.
    pub const ALL: [DeviceName; 2] = [DeviceName::Relays, DeviceName::Buzzer];

    /// Lowercase name used in logs and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relays => "relays",
            Self::Buzzer => "buzzer",
        }
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relays" => Ok(Self::Relays),
            "buzzer" => Ok(Self::Buzzer),
            other => Err(format!("unknown device: {other}")),
        }
    }
}

/// Connectivity of a device as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    /// Map a connected flag onto a status.
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Per-device connectivity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    pub name: DeviceName,
    pub state: ConnectionStatus,
}

/// One relay's label and on/off flag.
///
/// Serialized as `{"label": "...", "state": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayState {
    pub label: String,

    #[serde(rename = "state")]
    pub on: bool,
}

impl RelayState {
    pub fn new(label: impl Into<String>, on: bool) -> Self {
        Self {
            label: label.into(),
            on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_name_roundtrip() {
        for name in DeviceName::ALL {
            assert_eq!(name.as_str().parse::<DeviceName>().unwrap(), name);
        }
        assert!("door".parse::<DeviceName>().is_err());
    }

    #[test]
    fn test_relay_state_json_shape() {
        let json = serde_json::to_value(RelayState::new("lamp", true)).unwrap();
        assert_eq!(json, serde_json::json!({"label": "lamp", "state": true}));
    }

    #[test]
    fn test_device_state_json_shape() {
        let state = DeviceState {
            name: DeviceName::Buzzer,
            state: ConnectionStatus::from_connected(false),
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "buzzer", "state": "disconnected"})
        );
    }
}
