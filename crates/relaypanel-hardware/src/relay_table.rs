//! In-memory relay labels and on/off flags.

use parking_lot::RwLock;
use relaypanel_protocol::{RELAY_COUNT, RelayMask};

use crate::error::{HardwareError, Result};
use crate::types::RelayState;

/// Authoritative record of the 8 relays.
///
/// Guarded by its own lock, independent of the connection registry. Readers
/// always get a full snapshot.
#[derive(Debug, Default)]
pub struct RelayTable {
    relays: RwLock<[RelayState; RELAY_COUNT]>,
}

impl RelayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every on/off flag from a status bitmask.
    pub fn apply_mask(&self, mask: RelayMask) {
        let states = mask.states();
        let mut relays = self.relays.write();
        for (relay, on) in relays.iter_mut().zip(states) {
            relay.on = on;
        }
    }

    /// Replace all labels at once.
    pub fn set_labels(&self, labels: [String; RELAY_COUNT]) {
        let mut relays = self.relays.write();
        for (relay, label) in relays.iter_mut().zip(labels) {
            relay.label = label;
        }
    }

    /// Replace one label by 0-based index.
    pub fn update_label(&self, index: usize, label: impl Into<String>) -> Result<()> {
        let mut relays = self.relays.write();
        let relay = relays
            .get_mut(index)
            .ok_or(HardwareError::InvalidLabelIndex { index })?;
        relay.label = label.into();
        Ok(())
    }

    /// Consistent copy of all relays in board order.
    pub fn snapshot(&self) -> Vec<RelayState> {
        self.relays.read().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: [&str; RELAY_COUNT]) -> [String; RELAY_COUNT] {
        names.map(String::from)
    }

    #[test]
    fn test_starts_empty_and_off() {
        let table = RelayTable::new();
        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), RELAY_COUNT);
        assert!(snapshot.iter().all(|r| !r.on && r.label.is_empty()));
    }

    #[test]
    fn test_apply_mask_overwrites_all_bits() {
        let table = RelayTable::new();
        table.apply_mask(RelayMask::new(0xFF));
        table.apply_mask(RelayMask::new(0x05));

        let on: Vec<bool> = table.snapshot().iter().map(|r| r.on).collect();
        assert_eq!(on, vec![true, false, true, false, false, false, false, false]);
    }

    #[test]
    fn test_labels_survive_mask_updates() {
        let table = RelayTable::new();
        table.set_labels(labels(["a", "b", "c", "d", "e", "f", "g", "h"]));
        table.apply_mask(RelayMask::new(0x80));

        let snapshot = table.snapshot();
        assert_eq!(snapshot[0], RelayState::new("a", false));
        assert_eq!(snapshot[7], RelayState::new("h", true));
    }

    #[test]
    fn test_update_label_bounds() {
        let table = RelayTable::new();
        table.update_label(7, "porch").unwrap();
        assert_eq!(table.snapshot()[7].label, "porch");

        let err = table.update_label(8, "nope").unwrap_err();
        assert!(matches!(err, HardwareError::InvalidLabelIndex { index: 8 }));
    }
}
